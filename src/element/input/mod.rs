//! Built-in input elements.

mod checkbox;
mod csv_reader;
mod dropdown;
mod file_input;
mod folder_input;
mod number_input;
mod radio_button;
mod slider;
mod text_input;

pub use checkbox::Checkbox;
pub use csv_reader::CsvReader;
pub use dropdown::Dropdown;
pub use file_input::FileInput;
pub use folder_input::FolderInput;
pub use number_input::NumberInput;
pub use radio_button::RadioButton;
pub use slider::Slider;
pub use text_input::TextInput;
