pub mod button;
pub mod radio;
pub mod slider;
pub mod text;

pub use button::Button;
pub use radio::RadioButton;
pub use slider::Slider;
pub use text::Static;
