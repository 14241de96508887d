use std::path::Path;

use anyhow::Context;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul, pixel_span};
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::composite::{over, over_in_place, unpremultiply};

/// Destination raster shared by every component of one render.
///
/// Pixels are premultiplied RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            data: vec![0u8; canvas.byte_len()],
        }
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Raw premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Premultiplied pixel at `(x, y)`, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = self.index(x, y);
        Some(Rgba8Premul {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        })
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Draw `img` unscaled with its top-left corner at `at`, source-over, clipped to the surface.
    pub fn draw_image(&mut self, img: &PreparedImage, at: Point) {
        let ox = at.x.round() as i64;
        let oy = at.y.round() as i64;
        let (cw, ch) = (i64::from(self.canvas.width), i64::from(self.canvas.height));

        for sy in 0..i64::from(img.height) {
            let dy = oy + sy;
            if dy < 0 || dy >= ch {
                continue;
            }
            for sx in 0..i64::from(img.width) {
                let dx = ox + sx;
                if dx < 0 || dx >= cw {
                    continue;
                }
                let si = ((sy as usize) * (img.width as usize) + sx as usize) * 4;
                let s = &img.rgba8_premul[si..si + 4];
                let di = self.index(dx as u32, dy as u32);
                let d = &mut self.data[di..di + 4];
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        }
    }

    /// Scale the `src` region of `img` into `dst` with bilinear filtering, replacing the pixels
    /// under `dst` (clipped to the surface).
    pub fn draw_image_scaled(&mut self, img: &PreparedImage, src: Rect, dst: Rect) {
        self.scale_into(img, src, dst, Blend::Src);
    }

    /// Stretch the whole of `img` over the surface, source-over.
    pub fn draw_image_stretched(&mut self, img: &PreparedImage) {
        let src = Rect::new(0.0, 0.0, f64::from(img.width), f64::from(img.height));
        self.scale_into(img, src, self.canvas.rect(), Blend::Over);
    }

    fn scale_into(&mut self, img: &PreparedImage, src: Rect, dst: Rect, blend: Blend) {
        let (sx0, sx1) = pixel_span(src.x0, src.x1, img.width);
        let (sy0, sy1) = pixel_span(src.y0, src.y1, img.height);
        let dx0 = dst.x0.round() as i64;
        let dy0 = dst.y0.round() as i64;
        let dw = (dst.x1.round() as i64 - dx0).max(0) as u32;
        let dh = (dst.y1.round() as i64 - dy0).max(0) as u32;
        if sx1 == sx0 || sy1 == sy0 || dw == 0 || dh == 0 {
            return;
        }

        let Some(full) =
            image::RgbaImage::from_raw(img.width, img.height, img.rgba8_premul.to_vec())
        else {
            return;
        };
        let cropped = image::imageops::crop_imm(&full, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();
        let scaled =
            image::imageops::resize(&cropped, dw, dh, image::imageops::FilterType::Triangle);

        let (cw, ch) = (i64::from(self.canvas.width), i64::from(self.canvas.height));
        for (x, y, px) in scaled.enumerate_pixels() {
            let tx = dx0 + i64::from(x);
            let ty = dy0 + i64::from(y);
            if tx < 0 || ty < 0 || tx >= cw || ty >= ch {
                continue;
            }
            let di = self.index(tx as u32, ty as u32);
            let d = &mut self.data[di..di + 4];
            match blend {
                Blend::Src => d.copy_from_slice(&px.0),
                Blend::Over => {
                    let out = over([d[0], d[1], d[2], d[3]], px.0);
                    d.copy_from_slice(&out);
                }
            }
        }
    }

    /// Source-over a `width` x `height` premultiplied layer whose top-left sits at `(x, y)`.
    pub(crate) fn composite_layer_at(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        layer: &[u8],
    ) -> ImprintResult<()> {
        let fits = x.checked_add(width).is_some_and(|r| r <= self.canvas.width)
            && y.checked_add(height).is_some_and(|b| b <= self.canvas.height);
        if !fits {
            return Err(ImprintError::render(format!(
                "layer {width}x{height} at ({x},{y}) exceeds {}x{} surface",
                self.canvas.width, self.canvas.height
            )));
        }
        let row = width as usize * 4;
        if layer.len() != row * height as usize {
            return Err(ImprintError::render(format!(
                "layer buffer holds {} bytes, expected {}",
                layer.len(),
                row * height as usize
            )));
        }
        if row == 0 {
            return Ok(());
        }
        for (dy, src) in layer.chunks_exact(row).enumerate() {
            let start = self.index(x, y + dy as u32);
            over_in_place(&mut self.data[start..start + row], src)?;
        }
        Ok(())
    }

    /// Straight-alpha copy suitable for encoding.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let straight: Vec<u8> = self
            .data
            .chunks_exact(4)
            .flat_map(|px| unpremultiply([px[0], px[1], px[2], px[3]]))
            .collect();
        image::RgbaImage::from_raw(self.canvas.width, self.canvas.height, straight)
            .unwrap_or_else(|| image::RgbaImage::new(self.canvas.width, self.canvas.height))
    }

    /// Encode as PNG at `path`, creating parent directories.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImprintResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        self.to_rgba_image()
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))
            .map_err(ImprintError::from)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.canvas.width as usize) + x as usize) * 4
    }
}

#[derive(Clone, Copy)]
enum Blend {
    Src,
    Over,
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
