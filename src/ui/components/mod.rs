mod command_input;
mod input;
mod key_result;
mod release_list;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use key_result::KeyResult;
pub use release_list::release_item;
pub use search_input::{SearchEvent, SearchInput};
