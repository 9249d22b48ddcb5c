use image::Rgba;

/// A color struct that holds the red, green, and blue values of a color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

pub static WHITE: Color = Color::new(255, 255, 255);
pub static BLACK: Color = Color::new(0, 0, 0);
pub static HOUSE: Color = Color::new(222, 184, 135);
pub static HOSPITAL: Color = Color::new(214, 40, 40);

/// Path colors, cycled per house
static PATHS: [Color; 8] = [
    Color::new(255, 255, 0),
    Color::new(0, 0, 255),
    Color::new(0, 128, 0),
    Color::new(255, 165, 0),
    Color::new(128, 0, 128),
    Color::new(255, 192, 203),
    Color::new(0, 255, 255),
    Color::new(255, 0, 255),
];

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn path(index: usize) -> Self {
        PATHS[index % PATHS.len()]
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Rgba([color.red, color.green, color.blue, u8::MAX])
    }
}
