//! GIF fixtures for tests.

use std::borrow::Cow;

/// Logical screen edge length of fixture GIFs.
pub(crate) const SIZE: u16 = 4;

/// Black, red, green, blue.
pub(crate) const PALETTE: [u8; 12] = [0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255];

/// One frame filled with a single palette index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixtureFrame {
    pub color: u8,
    pub delay_cs: u16,
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

impl FixtureFrame {
    pub(crate) fn solid(color: u8, delay_cs: u16) -> Self {
        Self {
            color,
            delay_cs,
            left: 0,
            top: 0,
            width: SIZE,
            height: SIZE,
        }
    }

    pub(crate) fn offset(mut self, left: u16, top: u16) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub(crate) fn sized(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Encode `frames` as a looping GIF with the fixture palette.
pub(crate) fn encode_gif(frames: &[FixtureFrame]) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut bytes, SIZE, SIZE, &PALETTE).unwrap();
        encoder.set_repeat(gif::Repeat::Infinite).unwrap();
        for fixture in frames {
            let mut frame = gif::Frame::default();
            frame.left = fixture.left;
            frame.top = fixture.top;
            frame.width = fixture.width;
            frame.height = fixture.height;
            frame.delay = fixture.delay_cs;
            frame.buffer = Cow::Owned(vec![
                fixture.color;
                usize::from(fixture.width) * usize::from(fixture.height)
            ]);
            encoder.write_frame(&frame).unwrap();
        }
    }
    bytes
}
