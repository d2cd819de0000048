// vault-scribe mutates markdown notes inside a sandboxed vault directory:
// every path is resolved against the vault root before use, and every
// destructive write is preceded by a timestamped backup unless the caller
// opts out. Operations are stateless synchronous calls with no cross-call
// locking; two callers mutating the same note race at the filesystem level
// (last writer wins, a backup may capture an intermediate state).

pub mod backup;
pub mod daily;
pub mod errors;
pub mod frontmatter;
pub mod paths;
pub mod writer;

pub use backup::{create_backup, default_backup_dir, DEFAULT_BACKUP_DIR_NAME};
pub use daily::{append_to_daily_note, create_daily_note, daily_note_path, DailyNoteConfig};
pub use errors::{VaultError, VaultResult};
pub use frontmatter::{merge_updates, render, split, Frontmatter, SplitDocument};
pub use paths::resolve_note_path;
pub use writer::{
    append_to_note, create_note, delete_note, edit_note, update_metadata, WriteOptions,
};
