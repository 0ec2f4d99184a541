// model.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Decoded GIF model
use crate::block::{
    DisposalMethod, GraphicControl, ImageDesc, LogicalScreenDesc,
};
use pix::gray::Gray8;
use pix::rgb::SRgb8;
use pix::Raster;
use std::borrow::Cow;

/// Application identifier size
pub const APP_ID_SZ: usize = 8;

/// Application authentication code size
pub const APP_AUTH_SZ: usize = 3;

/// A decoded GIF stream.
///
/// Owns every image, color table, comment and application; dropping it
/// releases them all.
#[derive(Debug)]
pub struct Gif {
    /// Version from header
    pub(crate) version: [u8; 3],
    /// Logical screen descriptor
    pub(crate) screen: LogicalScreenDesc,
    /// Global color table
    pub(crate) global_color_table: Option<Vec<SRgb8>>,
    /// Images, in stream order
    pub(crate) images: Vec<Image>,
    /// Comments, most recent first
    pub(crate) comments: Vec<Comment>,
    /// Applications, most recent first
    pub(crate) applications: Vec<Application>,
}

/// One image of a GIF stream
#[derive(Debug)]
pub struct Image {
    /// Image descriptor
    pub(crate) desc: ImageDesc,
    /// Graphic control extension preceding the image
    pub(crate) control: Option<GraphicControl>,
    /// Local color table
    pub(crate) local_color_table: Option<Vec<SRgb8>>,
    /// Decoded color indices (width × height)
    pub(crate) indices: Vec<u8>,
}

/// Comment extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub(crate) data: Vec<u8>,
}

/// Application extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub(crate) app_id: [u8; APP_ID_SZ],
    pub(crate) auth_code: [u8; APP_AUTH_SZ],
    pub(crate) data: Vec<u8>,
}

impl Gif {
    /// Create an empty model from header and screen descriptor
    pub(crate) fn new(version: [u8; 3], screen: LogicalScreenDesc) -> Self {
        Gif {
            version,
            screen,
            global_color_table: None,
            images: vec![],
            comments: vec![],
            applications: vec![],
        }
    }

    /// Get the version (`87a` or `89a`)
    pub fn version(&self) -> [u8; 3] {
        self.version
    }

    /// Get the logical screen width
    pub fn screen_width(&self) -> u16 {
        self.screen.screen_width()
    }

    /// Get the logical screen height
    pub fn screen_height(&self) -> u16 {
        self.screen.screen_height()
    }

    /// Check the background flag (global color table present)
    pub fn background(&self) -> bool {
        !self.screen.color_table_config().is_empty()
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.screen.background_color_idx()
    }

    /// Get the raw pixel aspect ratio byte
    pub fn aspect_ratio(&self) -> u8 {
        self.screen.pixel_aspect_ratio()
    }

    /// Get the pixel aspect ratio (width / height), if specified
    pub fn pixel_aspect_ratio(&self) -> Option<f32> {
        match self.screen.pixel_aspect_ratio() {
            0 => None,
            par => Some((f32::from(par) + 15.0) / 64.0),
        }
    }

    /// Get the color resolution (bits per primary color)
    pub fn color_resolution(&self) -> u8 {
        self.screen.color_resolution()
    }

    /// Get the logical screen descriptor
    pub fn screen_desc(&self) -> &LogicalScreenDesc {
        &self.screen
    }

    /// Get the global color table
    pub fn global_color_table(&self) -> Option<&[SRgb8]> {
        self.global_color_table.as_deref()
    }

    /// Get all images, in stream order
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Get all comments, in reverse stream order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Get all applications, in reverse stream order
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Get the animation loop count (zero means loop forever)
    pub fn loop_count(&self) -> Option<u16> {
        self.applications.iter().find_map(|a| a.loop_count())
    }
}

impl Image {
    /// Create an image from its descriptor and pending graphic control
    pub(crate) fn new(
        desc: ImageDesc,
        control: Option<GraphicControl>,
    ) -> Self {
        Image {
            desc,
            control,
            local_color_table: None,
            indices: vec![],
        }
    }

    /// Get the left position
    pub fn left(&self) -> u16 {
        self.desc.left()
    }

    /// Get the top position
    pub fn top(&self) -> u16 {
        self.desc.top()
    }

    /// Get the width
    pub fn width(&self) -> u16 {
        self.desc.width()
    }

    /// Get the height
    pub fn height(&self) -> u16 {
        self.desc.height()
    }

    /// Check if rows are stored interlaced
    pub fn interlaced(&self) -> bool {
        self.desc.interlaced()
    }

    /// Check if the local color table is sorted
    pub fn sorted(&self) -> bool {
        self.desc.sorted()
    }

    /// Get the image descriptor
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Get the graphic control extension which preceded the image
    pub fn graphic_control(&self) -> Option<&GraphicControl> {
        self.control.as_ref()
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.control.map_or(0, |c| c.delay_time_cs())
    }

    /// Check the transparency flag
    pub fn transparent(&self) -> bool {
        self.transparent_color().is_some()
    }

    /// Get the transparent color index
    pub fn transparent_color(&self) -> Option<u8> {
        self.control.and_then(|c| c.transparent_color())
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        self.control.map(|c| c.disposal_method()).unwrap_or_default()
    }

    /// Check the user input flag
    pub fn user_input(&self) -> bool {
        self.control.map_or(false, |c| c.user_input())
    }

    /// Get the local color table
    pub fn local_color_table(&self) -> Option<&[SRgb8]> {
        self.local_color_table.as_deref()
    }

    /// Get the color indices, in stream row order
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Make a raster of color indices, in display row order.
    ///
    /// Pixels missing from short image data are index 0.
    pub fn raster(&self) -> Raster<Gray8> {
        let width = u32::from(self.width());
        let height = u32::from(self.height());
        let mut buf = if self.interlaced() {
            let w = usize::from(self.width());
            deinterlace(&self.indices, w, usize::from(self.height()))
        } else {
            self.indices.clone()
        };
        buf.resize(self.desc.image_sz(), 0);
        Raster::with_u8_buffer(width, height, buf)
    }
}

/// Interlace passes: (first row, row step)
const PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Reorder interlaced rows into display order
fn deinterlace(indices: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut buf = vec![0; width * height];
    let rows = PASSES
        .iter()
        .flat_map(|(first, step)| (*first..height).step_by(*step));
    for (row, dst) in indices.chunks_exact(width.max(1)).zip(rows) {
        let d = dst * width;
        buf[d..d + width].copy_from_slice(row);
    }
    buf
}

impl Comment {
    /// Get the comment bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the comment as text
    pub fn text(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl Application {
    /// Get the 8-byte application identifier
    pub fn app_id(&self) -> &[u8; APP_ID_SZ] {
        &self.app_id
    }

    /// Get the 3-byte authentication code
    pub fn auth_code(&self) -> &[u8; APP_AUTH_SZ] {
        &self.auth_code
    }

    /// Get the application payload.
    ///
    /// NOTE: the payload is delimited by scanning for a zero byte followed
    ///       by a trailer or extension introducer, so it contains sub-block
    ///       length bytes and any blocks before that point.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Check for an animation looping application
    fn is_looping(&self) -> bool {
        (&self.app_id == b"NETSCAPE" && &self.auth_code == b"2.0")
            || (&self.app_id == b"ANIMEXTS" && &self.auth_code == b"1.0")
    }

    /// Get the loop count (zero means loop forever)
    pub fn loop_count(&self) -> Option<u16> {
        let d = &self.data;
        let exists = self.is_looping()
            && d.len() >= 4
            && d[0] == 3 // sub-block length
            && d[1] == 1; // sub-block ID
        if exists {
            Some(u16::from(d[3]) << 8 | u16::from(d[2]))
        } else {
            None
        }
    }
}
