pub mod error;
pub mod history;
pub mod lookup;
pub mod model;
pub mod nav;
pub mod parse;
pub mod resolve;
pub mod select;
pub mod text;

pub use error::{LookupError, LookupResult};
pub use history::{JumpHistory, NavigationSink};
pub use lookup::{CscopeTool, LookupReport, LookupTool, find_tags};
pub use model::{Choice, GotoOutcome, JumpPosition, MatchRecord};
pub use nav::{Editor, Navigator, position_of};
pub use parse::{parse_line, parse_output, rebase_path};
pub use resolve::{INDEX_FILE_NAME, IndexConfig, IndexPaths, IndexResolver, Workspace};
pub use select::{Chooser, PresetChooser, select};
pub use text::{line_start_offset, offset_to_line, read_text_file, word_at};
