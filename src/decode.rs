// decode.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Container parser for GIF streams
use crate::block::*;
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::lzw;
use crate::model::{Application, Comment, Gif, Image, APP_AUTH_SZ, APP_ID_SZ};
use crate::stream::{read_u8, Stream};
use pix::rgb::SRgb8;

/// Parser which builds a [Gif](struct.Gif.html) model from a stream
pub(crate) struct Parser<S: Stream> {
    /// Stream to read
    stream: S,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Graphic control extension waiting for an image
    graphic_control_ext: Option<GraphicControl>,
}

impl<S: Stream> Parser<S> {
    /// Create a new parser
    pub fn new(stream: S, max_image_sz: Option<usize>) -> Self {
        Parser {
            stream,
            max_image_sz,
            graphic_control_ext: None,
        }
    }

    /// Read a fixed-size block
    fn read_block<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0; N];
        self.stream.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Parse the whole stream.
    ///
    /// On failure, everything built so far is dropped.
    pub fn parse(mut self) -> Result<Gif> {
        let header = Header::from_buf(&self.read_block::<{ size::HEADER }>()?)?;
        let screen = LogicalScreenDesc::from_buf(
            &self.read_block::<{ size::LOGICAL_SCREEN_DESC }>()?,
        );
        debug!("screen: {:?}", screen);
        let mut gif = Gif::new(header.version(), screen);
        gif.global_color_table =
            self.read_color_table(screen.color_table_config())?;
        loop {
            let t = read_u8(&mut self.stream)?;
            match BlockCode::from_u8(t) {
                Some(BlockCode::Extension_) => self.parse_extension(&mut gif)?,
                Some(BlockCode::ImageDesc_) => {
                    let image = self.parse_image()?;
                    gif.images.push(image);
                }
                Some(BlockCode::Trailer_) => break,
                None => return Err(Error::InvalidBlockCode(t)),
            }
        }
        if self.graphic_control_ext.is_some() {
            warn!("graphic control extension without image");
        }
        Ok(gif)
    }

    /// Read a color table, if present
    fn read_color_table(
        &mut self,
        config: ColorTableConfig,
    ) -> Result<Option<Vec<SRgb8>>> {
        if config.is_empty() {
            return Ok(None);
        }
        let mut buf = Buffer::new(config.size_bytes())?;
        buf.fill_from(&mut self.stream, config.size_bytes())?;
        Ok(Some(color_table(buf.as_slice())))
    }

    /// Parse an extension block
    fn parse_extension(&mut self, gif: &mut Gif) -> Result<()> {
        use crate::block::ExtensionCode::*;
        let label = read_u8(&mut self.stream)?;
        let et = ExtensionCode::from(label);
        debug!("  block  : {:?}", et);
        match et {
            PlainText_ => self.skip_sub_blocks(),
            GraphicControl_ => self.parse_graphic_control(),
            Comment_ => {
                if let Some(comment) = self.parse_comment()? {
                    gif.comments.insert(0, comment);
                }
                Ok(())
            }
            Application_ => {
                if let Some(app) = self.parse_application()? {
                    gif.applications.insert(0, app);
                }
                Ok(())
            }
            Unknown_(n) => Err(Error::InvalidExtension(n)),
        }
    }

    /// Skip sub-blocks up to and including the block terminator
    fn skip_sub_blocks(&mut self) -> Result<()> {
        loop {
            match read_u8(&mut self.stream)? {
                0 => return Ok(()),
                sz => self.stream.move_by(sz.into())?,
            }
        }
    }

    /// Parse a graphic control extension
    fn parse_graphic_control(&mut self) -> Result<()> {
        // only one per image
        if self.graphic_control_ext.is_some() {
            return Err(Error::InvalidBlockSequence);
        }
        let buf = self.read_block::<{ size::GRAPHIC_CONTROL }>()?;
        self.graphic_control_ext = Some(GraphicControl::from_buf(&buf)?);
        Ok(())
    }

    /// Parse a comment extension.
    ///
    /// Sub-blocks are skipped once to measure the payload, then re-read.
    fn parse_comment(&mut self) -> Result<Option<Comment>> {
        let mut comment_sz = 0;
        let mut total: i64 = 1;
        loop {
            let sz = read_u8(&mut self.stream)?;
            if sz == 0 {
                break;
            }
            comment_sz += usize::from(sz);
            total += i64::from(sz) + 1;
            self.stream.move_by(sz.into())?;
        }
        if comment_sz == 0 {
            return Ok(None);
        }
        let mut buf = Buffer::new(comment_sz)?;
        self.stream.move_by(-total)?;
        loop {
            let sz = read_u8(&mut self.stream)?;
            if sz == 0 {
                break;
            }
            buf.fill_from(&mut self.stream, sz.into())?;
        }
        Ok(Some(Comment {
            data: buf.into_vec(),
        }))
    }

    /// Parse an application extension.
    ///
    /// The payload ends at the first zero byte followed by a trailer or an
    /// extension introducer.  This is a heuristic: payloads containing
    /// those byte pairs end early, and a payload followed directly by an
    /// image swallows the image.
    fn parse_application(&mut self) -> Result<Option<Application>> {
        let buf = self.read_block::<{ size::APPLICATION }>()?;
        if usize::from(buf[0]) != APP_ID_SZ + APP_AUTH_SZ {
            return Err(Error::MalformedApplicationExtension);
        }
        let mut app_id = [0; APP_ID_SZ];
        app_id.copy_from_slice(&buf[1..=APP_ID_SZ]);
        let mut auth_code = [0; APP_AUTH_SZ];
        auth_code.copy_from_slice(&buf[APP_ID_SZ + 1..]);
        let mut total: i64 = 0;
        loop {
            if read_u8(&mut self.stream)? == 0 {
                let t = read_u8(&mut self.stream)?;
                if t == BlockCode::Trailer_.signature()
                    || t == BlockCode::Extension_.signature()
                {
                    self.stream.move_by(-total - 2)?;
                    break;
                }
                self.stream.move_by(-1)?;
            }
            total += 1;
        }
        let data_sz = total as usize;
        let app = if data_sz > 0 {
            let mut data = Buffer::new(data_sz)?;
            data.fill_from(&mut self.stream, data_sz)?;
            Some(Application {
                app_id,
                auth_code,
                data: data.into_vec(),
            })
        } else {
            None
        };
        // block terminator
        self.stream.move_by(1)?;
        Ok(app)
    }

    /// Parse an image descriptor, color table and image data
    fn parse_image(&mut self) -> Result<Image> {
        let desc =
            ImageDesc::from_buf(&self.read_block::<{ size::IMAGE_DESC }>()?);
        debug!("  block  : {:?}", desc);
        let image_sz = desc.image_sz();
        if let Some(sz) = self.max_image_sz {
            if image_sz > sz {
                return Err(Error::TooLargeImage);
            }
        }
        let mut image = Image::new(desc, self.graphic_control_ext.take());
        image.local_color_table =
            self.read_color_table(desc.color_table_config())?;
        let mut indices = Buffer::new(image_sz)?;
        lzw::decompress(&mut self.stream, &mut indices)?;
        if indices.size() < image_sz {
            warn!("image data short: {} of {}", indices.size(), image_sz);
        }
        image.indices = indices.into_vec();
        Ok(image)
    }
}

impl Header {
    /// Decode a Header block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), size::HEADER);
        if &buf[..3] == b"GIF" {
            let version = [buf[3], buf[4], buf[5]];
            match &version {
                b"87a" | b"89a" => Ok(Header::with_version(version)),
                _ => Err(Error::UnsupportedVersion(version)),
            }
        } else {
            Err(Error::MalformedHeader)
        }
    }
}

impl LogicalScreenDesc {
    /// Decode a Logical Screen Descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), size::LOGICAL_SCREEN_DESC);
        let width = u16::from_le_bytes([buf[0], buf[1]]);
        let height = u16::from_le_bytes([buf[2], buf[3]]);
        LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_flags(buf[4])
            .with_background_color_idx(buf[5])
            .with_pixel_aspect_ratio(buf[6])
    }
}

impl GraphicControl {
    /// Decode a Graphic Control extension from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), size::GRAPHIC_CONTROL);
        if buf[0] != 4 || buf[5] != 0 {
            return Err(Error::MalformedGraphicControlExtension);
        }
        let delay = u16::from_le_bytes([buf[2], buf[3]]);
        let control = GraphicControl::default()
            .with_flags(buf[1])
            .with_delay_time_cs(delay)
            .with_transparent_color_idx(buf[4]);
        if let DisposalMethod::Reserved(n) = control.disposal_method() {
            warn!("reserved disposal method: {}", n);
        }
        Ok(control)
    }
}

impl ImageDesc {
    /// Decode an Image Descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), size::IMAGE_DESC);
        let left = u16::from_le_bytes([buf[0], buf[1]]);
        let top = u16::from_le_bytes([buf[2], buf[3]]);
        let width = u16::from_le_bytes([buf[4], buf[5]]);
        let height = u16::from_le_bytes([buf[6], buf[7]]);
        ImageDesc::default()
            .with_left(left)
            .with_top(top)
            .with_width(width)
            .with_height(height)
            .with_flags(buf[8])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lzw::test::Packer;
    use crate::Decoder;
    use std::io::Cursor;

    const HEADER_1X1: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x00,
        0x00, 0x00,
    ];

    const IMAGE_1X1: &[u8] = &[
        0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02,
        0x02, 0x54, 0x01, 0x00,
    ];

    const GRAPHIC_CONTROL: &[u8] =
        &[0x21, 0xf9, 0x04, 0x05, 0x0a, 0x00, 0x03, 0x00];

    fn gif(parts: &[&[u8]]) -> Vec<u8> {
        let mut v: Vec<u8> = parts.concat();
        v.push(0x3b);
        v
    }

    fn decode(data: &[u8]) -> Result<Gif> {
        Decoder::new(Cursor::new(data)).decode()
    }

    fn comment(text: &[u8]) -> Vec<u8> {
        let mut v = vec![0x21, 0xfe];
        for chunk in text.chunks(255) {
            v.push(chunk.len() as u8);
            v.extend_from_slice(chunk);
        }
        v.push(0);
        v
    }

    #[test]
    fn simple_1() -> Result<()> {
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91,
            0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF,
            0x00, 0x00, 0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02,
            0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
            0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C,
            0x01, 0x00, 0x3B,
        ];
        let image = [
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
        ];
        let g = decode(&gif)?;
        assert_eq!(g.screen_width(), 10);
        assert_eq!(g.screen_height(), 10);
        assert!(g.background());
        let gct = g.global_color_table().unwrap();
        assert_eq!(gct.len(), 4);
        assert_eq!(gct[1], SRgb8::new(0xFF, 0x00, 0x00));
        assert_eq!(g.images().len(), 1);
        assert_eq!(g.images()[0].indices(), &image[..]);
        Ok(())
    }

    #[test]
    fn single_pixel() -> Result<()> {
        let g = decode(&gif(&[HEADER_1X1, IMAGE_1X1]))?;
        assert_eq!(g.version(), *b"89a");
        assert!(g.global_color_table().is_none());
        let img = &g.images()[0];
        assert_eq!(img.indices(), &[2]);
        assert_eq!(img.indices().len(), 1);
        assert!(img.local_color_table().is_none());
        assert!(!img.transparent());
        Ok(())
    }

    #[test]
    fn image_size() -> Result<()> {
        let (w, h) = (7u16, 5u16);
        let mut p = Packer::new(2);
        p.clear();
        for i in 0..u32::from(w * h) {
            p.code(i % 3);
        }
        p.end();
        let mut desc = vec![0x2c, 0x01, 0x00, 0x02, 0x00];
        desc.extend_from_slice(&w.to_le_bytes());
        desc.extend_from_slice(&h.to_le_bytes());
        desc.push(0x81); // local color table, 4 entries
        desc.extend_from_slice(&[0; 12]);
        let g = decode(&gif(&[HEADER_1X1, &desc, &p.image_data()]))?;
        let img = &g.images()[0];
        assert_eq!(img.indices().len(), usize::from(w * h));
        assert_eq!((img.left(), img.top()), (1, 2));
        assert_eq!(img.local_color_table().map(|t| t.len()), Some(4));
        assert_eq!(img.raster().height(), 5);
        Ok(())
    }

    #[test]
    fn invalid_signature() {
        let mut data = gif(&[HEADER_1X1, IMAGE_1X1]);
        data[0] = b'J';
        let e = decode(&data).unwrap_err();
        assert!(matches!(e, Error::MalformedHeader));
        assert_eq!(e.kind(), ErrorKind::Format);
    }

    #[test]
    fn invalid_version() {
        let mut data = gif(&[HEADER_1X1, IMAGE_1X1]);
        data[4] = b'8';
        assert!(matches!(
            decode(&data),
            Err(Error::UnsupportedVersion(v)) if &v == b"88a"
        ));
    }

    #[test]
    fn truncated() {
        let data = gif(&[HEADER_1X1, IMAGE_1X1]);
        let e = decode(&data[..data.len() - 1]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::TruncatedStream);
        let e = decode(&data[..5]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::TruncatedStream);
    }

    #[test]
    fn invalid_block() {
        let data = gif(&[HEADER_1X1, &[0x2b]]);
        assert!(matches!(decode(&data), Err(Error::InvalidBlockCode(0x2b))));
        let data = gif(&[HEADER_1X1, &[0x21, 0x02, 0x00]]);
        assert!(matches!(decode(&data), Err(Error::InvalidExtension(2))));
    }

    #[test]
    fn graphic_control_one_image() -> Result<()> {
        let g = decode(&gif(&[
            HEADER_1X1,
            GRAPHIC_CONTROL,
            IMAGE_1X1,
            IMAGE_1X1,
        ]))?;
        let images = g.images();
        assert_eq!(images.len(), 2);
        assert!(images[0].transparent());
        assert_eq!(images[0].transparent_color(), Some(3));
        assert_eq!(images[0].delay_time_cs(), 10);
        assert_eq!(images[0].disposal_method(), DisposalMethod::Keep);
        assert!(!images[1].transparent());
        assert_eq!(images[1].delay_time_cs(), 0);
        assert!(images[1].graphic_control().is_none());
        Ok(())
    }

    #[test]
    fn graphic_control_reserved_disposal() -> Result<()> {
        // disposal bits 5, transparent flag clear
        let control = [0x21, 0xf9, 0x04, 0x14, 0x00, 0x00, 0x00, 0x00];
        let g = decode(&gif(&[HEADER_1X1, &control, IMAGE_1X1]))?;
        let img = &g.images()[0];
        assert_eq!(img.disposal_method(), DisposalMethod::Reserved(5));
        assert!(!img.transparent());
        assert_eq!(img.indices(), &[2]);
        Ok(())
    }

    #[test]
    fn graphic_control_twice() {
        let data =
            gif(&[HEADER_1X1, GRAPHIC_CONTROL, GRAPHIC_CONTROL, IMAGE_1X1]);
        let e = decode(&data).unwrap_err();
        assert!(matches!(e, Error::InvalidBlockSequence));
        assert_eq!(e.kind(), ErrorKind::ProtocolViolation);
    }

    #[test]
    fn graphic_control_malformed() {
        let data = gif(&[
            HEADER_1X1,
            &[0x21, 0xf9, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00],
        ]);
        assert!(matches!(
            decode(&data),
            Err(Error::MalformedGraphicControlExtension)
        ));
        let data = gif(&[
            HEADER_1X1,
            &[0x21, 0xf9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x01],
        ]);
        assert!(matches!(
            decode(&data),
            Err(Error::MalformedGraphicControlExtension)
        ));
    }

    #[test]
    fn comment_order() -> Result<()> {
        let long = [b'x'; 300];
        let g = decode(&gif(&[
            HEADER_1X1,
            &comment(b"first"),
            IMAGE_1X1,
            &comment(&long),
            &comment(b"last"),
        ]))?;
        let c = g.comments();
        assert_eq!(c.len(), 3);
        assert_eq!(c[0].text(), "last");
        assert_eq!(c[1].data(), &long[..]);
        assert_eq!(c[2].text(), "first");
        assert_eq!(g.images().len(), 1);
        Ok(())
    }

    #[test]
    fn empty_comment() -> Result<()> {
        let g = decode(&gif(&[HEADER_1X1, &[0x21, 0xfe, 0x00], IMAGE_1X1]))?;
        assert!(g.comments().is_empty());
        assert_eq!(g.images().len(), 1);
        Ok(())
    }

    #[test]
    fn plain_text_skipped() -> Result<()> {
        let mut pt = vec![0x21, 0x01, 0x0c];
        pt.extend_from_slice(&[0; 12]);
        pt.extend_from_slice(&[0x02, b'h', b'i', 0x00]);
        let g = decode(&gif(&[HEADER_1X1, &pt, IMAGE_1X1]))?;
        assert_eq!(g.images()[0].indices(), &[2]);
        Ok(())
    }

    #[test]
    fn application_loop() -> Result<()> {
        let mut app = vec![0x21, 0xff, 0x0b];
        app.extend_from_slice(b"NETSCAPE2.0");
        app.extend_from_slice(&[0x03, 0x01, 0x05, 0x00, 0x00]);
        let g = decode(&gif(&[HEADER_1X1, &app, GRAPHIC_CONTROL, IMAGE_1X1]))?;
        let a = &g.applications()[0];
        assert_eq!(a.app_id(), b"NETSCAPE");
        assert_eq!(a.auth_code(), b"2.0");
        assert_eq!(a.data(), &[0x03, 0x01, 0x05, 0x00]);
        assert_eq!(g.loop_count(), Some(5));
        assert_eq!(g.images().len(), 1);
        assert!(g.images()[0].transparent());
        Ok(())
    }

    #[test]
    fn application_inner_zero() -> Result<()> {
        // zero bytes inside the payload not followed by a trailer or an
        // extension introducer are kept
        let mut app = vec![0x21, 0xff, 0x0b];
        app.extend_from_slice(b"ABCDEFGH123");
        app.extend_from_slice(&[0x04, 0x00, 0x2c, 0x00, 0x07, 0x00]);
        let mut app2 = vec![0x21, 0xff, 0x0b];
        app2.extend_from_slice(b"IJKLMNOP456");
        app2.extend_from_slice(&[0x01, 0x09, 0x00]);
        let g = decode(&gif(&[HEADER_1X1, &app, &app2]))?;
        let apps = g.applications();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].app_id(), b"IJKLMNOP");
        assert_eq!(apps[0].data(), &[0x01, 0x09]);
        assert_eq!(apps[1].app_id(), b"ABCDEFGH");
        assert_eq!(apps[1].data(), &[0x04, 0x00, 0x2c, 0x00, 0x07]);
        Ok(())
    }

    #[test]
    fn application_swallows_image() -> Result<()> {
        // an image directly after the payload is taken as payload
        let mut app = vec![0x21, 0xff, 0x0b];
        app.extend_from_slice(b"NETSCAPE2.0");
        app.extend_from_slice(&[0x03, 0x01, 0x00, 0x00, 0x00]);
        let g = decode(&gif(&[HEADER_1X1, &app, IMAGE_1X1]))?;
        assert!(g.images().is_empty());
        let data = g.applications()[0].data();
        assert_eq!(data.len(), 4 + IMAGE_1X1.len());
        Ok(())
    }

    #[test]
    fn application_empty() -> Result<()> {
        let mut app = vec![0x21, 0xff, 0x0b];
        app.extend_from_slice(b"EMPTYAPP1.0");
        app.push(0x00);
        let g = decode(&gif(&[HEADER_1X1, &app, &comment(b"c")]))?;
        assert!(g.applications().is_empty());
        assert_eq!(g.comments().len(), 1);
        Ok(())
    }

    #[test]
    fn application_malformed() {
        let mut app = vec![0x21, 0xff, 0x0a];
        app.extend_from_slice(b"NETSCAPE2.0");
        app.push(0x00);
        assert!(matches!(
            decode(&gif(&[HEADER_1X1, &app])),
            Err(Error::MalformedApplicationExtension)
        ));
    }

    #[test]
    fn too_large() {
        let data = gif(&[HEADER_1X1, IMAGE_1X1]);
        let res = Decoder::new(Cursor::new(&data[..]))
            .max_image_sz(Some(0))
            .decode();
        let e = res.unwrap_err();
        assert!(matches!(e, Error::TooLargeImage));
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);
    }

    #[test]
    fn interlaced_raster() -> Result<()> {
        let mut p = Packer::new(2);
        p.clear();
        for row in [0, 2, 1, 3].iter() {
            p.code(*row);
        }
        p.end();
        let desc = [0x2c, 0, 0, 0, 0, 0x01, 0x00, 0x04, 0x00, 0x40];
        let g = decode(&gif(&[HEADER_1X1, &desc, &p.image_data()]))?;
        let img = &g.images()[0];
        assert_eq!(img.indices(), &[0, 2, 1, 3]);
        let raster = img.raster();
        assert_eq!(raster.as_u8_slice(), &[0, 1, 2, 3]);
        Ok(())
    }
}
