// block.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Fixed-layout blocks of a GIF stream
use pix::rgb::SRgb8;

/// Bytes per color table entry
const CHANNELS: usize = 3;

/// Color table presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableExistence {
    /// No color table
    Absent,
    /// Color table follows the descriptor
    Present,
}

/// Color table ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableOrdering {
    /// Not sorted
    NotSorted,
    /// Sorted by decreasing importance
    Sorted,
}

/// Color table configuration, from descriptor packed fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    existence: ColorTableExistence,
    ordering: ColorTableOrdering,
    table_len: usize, // must be between 2...256
}

impl ColorTableConfig {
    /// Get the color table existence
    pub fn existence(&self) -> ColorTableExistence {
        self.existence
    }

    /// Get the color table ordering
    pub fn ordering(&self) -> ColorTableOrdering {
        self.ordering
    }

    /// Get the number of entries (0 if absent)
    pub fn len(&self) -> usize {
        match self.existence {
            ColorTableExistence::Absent => 0,
            ColorTableExistence::Present => self.table_len,
        }
    }

    /// Check if the table is absent
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the size of the table in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * CHANNELS
    }
}

/// Build a color table from RGB triples
pub(crate) fn color_table(buf: &[u8]) -> Vec<SRgb8> {
    buf.chunks_exact(CHANNELS)
        .map(|c| SRgb8::new(c[0], c[1], c[2]))
        .collect()
}

/// Method to dispose of an image after display
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified
    NoAction,
    /// Leave image in place
    Keep,
    /// Restore to background color
    Background,
    /// Restore to previous contents
    Previous,
    /// Reserved value
    Reserved(u8),
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::NoAction
    }
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            _ => Reserved(n & 0b0111),
        }
    }
}

/// Block introducers
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Extension_,
    ImageDesc_,
    Trailer_,
}

impl BlockCode {
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            _ => None,
        }
    }

    pub fn signature(self) -> u8 {
        use self::BlockCode::*;
        match self {
            ImageDesc_ => b',',
            Extension_ => b'!',
            Trailer_ => b';',
        }
    }
}

/// Sizes of fixed-layout blocks (after any introducer)
pub(crate) mod size {
    /// Signature and version
    pub const HEADER: usize = 6;
    /// Logical screen descriptor
    pub const LOGICAL_SCREEN_DESC: usize = 7;
    /// Image descriptor
    pub const IMAGE_DESC: usize = 9;
    /// Graphic control extension, with block size and terminator
    pub const GRAPHIC_CONTROL: usize = 6;
    /// Application extension header, with block size
    pub const APPLICATION: usize = 12;
}

/// Extension labels
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
    Unknown_(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        use self::ExtensionCode::*;
        match n {
            0x01 => PlainText_,
            0xF9 => GraphicControl_,
            0xFE => Comment_,
            0xFF => Application_,
            _ => Unknown_(n),
        }
    }
}

/// Header block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    version: [u8; 3],
}

impl Header {
    /// Create a header with a version
    pub fn with_version(version: [u8; 3]) -> Self {
        Header { version }
    }

    /// Get the version (`87a` or `89a`)
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Logical screen descriptor block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8, // index into global color table
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }
    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }
    pub fn flags(&self) -> u8 {
        self.flags
    }
    /// Get the color resolution (bits per primary color)
    pub fn color_resolution(&self) -> u8 {
        ((self.flags & Self::COLOR_RESOLUTION) >> 4) + 1
    }
    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        };
        let ordering = if self.flags & Self::COLOR_TABLE_ORDERING != 0 {
            ColorTableOrdering::Sorted
        } else {
            ColorTableOrdering::NotSorted
        };
        let table_len = 2 << (self.flags & Self::COLOR_TABLE_SIZE);
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }
    pub fn with_background_color_idx(
        mut self,
        background_color_idx: u8,
    ) -> Self {
        self.background_color_idx = background_color_idx;
        self
    }
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }
    pub fn with_pixel_aspect_ratio(mut self, pixel_aspect_ratio: u8) -> Self {
        self.pixel_aspect_ratio = pixel_aspect_ratio;
        self
    }
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Graphic control extension block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }
    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }
    pub fn user_input(&self) -> bool {
        (self.flags & Self::USER_INPUT) != 0
    }
    pub fn with_delay_time_cs(mut self, delay_time_cs: u16) -> Self {
        self.delay_time_cs = delay_time_cs;
        self
    }
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }
    pub fn with_transparent_color_idx(mut self, idx: u8) -> Self {
        self.transparent_color_idx = idx;
        self
    }
    /// Get the transparent color index, if the transparency flag is set
    pub fn transparent_color(&self) -> Option<u8> {
        if self.flags & Self::TRANSPARENT_COLOR != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }
}

/// Image descriptor block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn with_left(mut self, left: u16) -> Self {
        self.left = left;
        self
    }
    pub fn left(&self) -> u16 {
        self.left
    }
    pub fn with_top(mut self, top: u16) -> Self {
        self.top = top;
        self
    }
    pub fn top(&self) -> u16 {
        self.top
    }
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }
    pub fn width(&self) -> u16 {
        self.width
    }
    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }
    pub fn height(&self) -> u16 {
        self.height
    }
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }
    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn interlaced(&self) -> bool {
        (self.flags & Self::INTERLACED) != 0
    }
    pub fn sorted(&self) -> bool {
        (self.flags & Self::COLOR_TABLE_ORDERING) != 0
    }
    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        };
        let ordering = if self.sorted() {
            ColorTableOrdering::Sorted
        } else {
            ColorTableOrdering::NotSorted
        };
        let table_len = 2 << (self.flags & Self::COLOR_TABLE_SIZE);
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }
    /// Get the number of pixels
    pub fn image_sz(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn color_table_len() {
        let d = LogicalScreenDesc::default().with_flags(0x80);
        assert_eq!(d.color_table_config().len(), 2);
        assert_eq!(d.color_table_config().size_bytes(), 6);
        let d = LogicalScreenDesc::default().with_flags(0x87);
        assert_eq!(d.color_table_config().len(), 256);
        let d = LogicalScreenDesc::default().with_flags(0x07);
        assert_eq!(d.color_table_config().len(), 0);
        assert!(d.color_table_config().is_empty());
        let d = ImageDesc::default().with_flags(0xA3);
        let c = d.color_table_config();
        assert_eq!(c.len(), 16);
        assert_eq!(c.ordering(), ColorTableOrdering::Sorted);
        assert!(!d.interlaced());
    }

    #[test]
    fn screen_flags() {
        let d = LogicalScreenDesc::default().with_flags(0b1101_1010);
        assert_eq!(d.color_resolution(), 6);
        assert_eq!(
            d.color_table_config().ordering(),
            ColorTableOrdering::Sorted
        );
        assert_eq!(
            d.color_table_config().existence(),
            ColorTableExistence::Present
        );
    }

    #[test]
    fn graphic_control() {
        let g = GraphicControl::default().with_flags(0b0000_1011);
        assert_eq!(g.disposal_method(), DisposalMethod::Background);
        assert!(g.user_input());
        let g = g.with_transparent_color_idx(7);
        assert_eq!(g.transparent_color(), Some(7));
        let g = GraphicControl::default().with_transparent_color_idx(7);
        assert_eq!(g.transparent_color(), None);
        let g = GraphicControl::default().with_flags(0b0001_1100);
        assert_eq!(g.disposal_method(), DisposalMethod::Reserved(7));
    }

    #[test]
    fn block_codes() {
        assert_eq!(BlockCode::from_u8(0x2C), Some(BlockCode::ImageDesc_));
        assert_eq!(BlockCode::from_u8(0x21), Some(BlockCode::Extension_));
        assert_eq!(BlockCode::from_u8(0x3B), Some(BlockCode::Trailer_));
        assert_eq!(BlockCode::from_u8(0x00), None);
        assert_eq!(BlockCode::Trailer_.signature(), 0x3B);
        assert_eq!(ExtensionCode::from(0x01), ExtensionCode::PlainText_);
        assert_eq!(ExtensionCode::from(0x02), ExtensionCode::Unknown_(2));
    }

    #[test]
    fn color_triples() {
        let t = color_table(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(t, vec![SRgb8::new(1, 2, 3), SRgb8::new(4, 5, 6)]);
    }
}
