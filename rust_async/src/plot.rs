use std::f64::consts::TAU;
use std::path::Path;

use image::{ImageResult, Rgba, RgbaImage};
use pi_progress::{ProgressObserver, ProgressSnapshot, SamplePoint};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OUTLINE: Rgba<u8> = Rgba([160, 160, 160, 255]);
const INSIDE: Rgba<u8> = Rgba([30, 80, 220, 255]);
const OUTSIDE: Rgba<u8> = Rgba([220, 40, 40, 255]);

/// Square scatter plot of the `[-1, 1]²` sampling area.
///
/// Points inside the unit circle are drawn blue, the rest red, over a grey
/// outline of the circle itself.
#[derive(Debug)]
pub struct PointCanvas {
    image: RgbaImage,
    plotted: usize,
}

impl PointCanvas {
    pub fn new(size: u32) -> Self {
        let size = size.max(2);
        let mut canvas = Self {
            image: RgbaImage::from_pixel(size, size, BACKGROUND),
            plotted: 0,
        };
        canvas.draw_outline();
        canvas
    }

    pub fn plotted(&self) -> usize {
        self.plotted
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn plot(&mut self, point: SamplePoint) {
        let (px, py) = self.to_pixel(point.x, point.y);
        let color = if point.inside { INSIDE } else { OUTSIDE };
        self.image.put_pixel(px, py, color);
        self.plotted += 1;
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save(path)
    }

    fn draw_outline(&mut self) {
        let steps = self.image.width() * 4;
        for i in 0..steps {
            let angle = TAU * f64::from(i) / f64::from(steps);
            let (px, py) = self.to_pixel(angle.cos(), angle.sin());
            self.image.put_pixel(px, py, OUTLINE);
        }
    }

    /// Maps `[-1, 1]` onto pixel coordinates, y axis pointing up.
    fn to_pixel(&self, x: f64, y: f64) -> (u32, u32) {
        let max = f64::from(self.image.width() - 1);
        let px = ((x.clamp(-1.0, 1.0) + 1.0) / 2.0 * max).round() as u32;
        let py = ((1.0 - y.clamp(-1.0, 1.0)) / 2.0 * max).round() as u32;
        (px, py)
    }
}

impl ProgressObserver for PointCanvas {
    fn on_progress(&mut self, _snapshot: ProgressSnapshot) {}

    fn on_points(&mut self, points: &[SamplePoint]) {
        for point in points {
            self.plot(*point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn points_land_in_expected_pixels() {
        let mut canvas = PointCanvas::new(101);
        canvas.on_points(&[
            SamplePoint { x: 0.0, y: 0.0, inside: true },
            SamplePoint { x: 1.0, y: 1.0, inside: false },
            SamplePoint { x: -1.0, y: -1.0, inside: false },
        ]);

        assert_eq!(canvas.plotted(), 3);
        assert_eq!(*canvas.image().get_pixel(50, 50), INSIDE);
        assert_eq!(*canvas.image().get_pixel(100, 0), OUTSIDE);
        assert_eq!(*canvas.image().get_pixel(0, 100), OUTSIDE);
    }

    #[test]
    fn outline_is_drawn_on_the_circle() {
        let canvas = PointCanvas::new(101);
        assert_eq!(*canvas.image().get_pixel(100, 50), OUTLINE);
        assert_eq!(*canvas.image().get_pixel(50, 0), OUTLINE);
        assert_eq!(*canvas.image().get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.png");
        PointCanvas::new(64).save(&path).unwrap();

        let reopened = image::open(&path).unwrap();
        assert_eq!(reopened.dimensions(), (64, 64));
    }
}
