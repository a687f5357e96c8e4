mod fs_ops;
mod package;
mod runner;
mod sessions;
mod shell;
mod snapshot;
mod snapshot_worker;
mod terminal_log;

pub use fs_ops::{create_file, create_folder, delete_entry, rename_entry};
pub use package::npm_scripts;
pub use runner::{CommandRunner, RunnerEvent, RunnerEventKind, StopOutcome};
pub use sessions::{EditorSession, SessionId, SessionRegistry};
pub use shell::ShellCommand;
pub use snapshot::{DirectoryEntry, EntryFilter, snapshot};
pub use snapshot_worker::SnapshotWorker;
pub use terminal_log::{DEFAULT_SCROLLBACK, LineStyle, TerminalLine, TerminalLog};
