//! Ambient glow color sampling.
//!
//! While a session is playing, a background task periodically samples the
//! current video frame, averages it into one color, boosts its brightness
//! and publishes it through the session's snapshot channel. The task is
//! cosmetic only: it self-terminates as soon as the published state leaves
//! `Playing`, and the session aborts it outright on pause, error and
//! teardown.

use crate::session::{PlaybackState, SessionSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

/// Sampling period for the glow loop
const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Brightness multiplier applied to the averaged frame color
const BRIGHTNESS_BOOST: f32 = 1.3;

/// An RGB glow color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlowColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Supplies downscaled frame pixels for averaging.
///
/// Returns `None` when no frame is available yet; the loop just waits for
/// the next tick.
pub trait FrameSampler: Send + Sync {
    fn sample_frame(&self) -> Option<Vec<GlowColor>>;
}

/// Abort-on-drop handle for the ambient task
pub struct AmbientHandle {
    handle: JoinHandle<()>,
}

impl AmbientHandle {
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for AmbientHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start the glow loop against a session's snapshot channel
pub fn spawn_ambient(
    sampler: Arc<dyn FrameSampler>,
    tx: Arc<watch::Sender<SessionSnapshot>>,
) -> AmbientHandle {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if tx.borrow().state != PlaybackState::Playing {
                break;
            }

            if let Some(pixels) = sampler.sample_frame() {
                let color = boost_brightness(average_color(&pixels), BRIGHTNESS_BOOST);
                trace!(r = color.r, g = color.g, b = color.b, "Ambient color sampled");
                tx.send_modify(|snapshot| snapshot.glow = Some(color));
            }
        }
    });

    AmbientHandle { handle }
}

/// Arithmetic mean per channel; black for an empty frame
fn average_color(pixels: &[GlowColor]) -> GlowColor {
    if pixels.is_empty() {
        return GlowColor { r: 0, g: 0, b: 0 };
    }

    let count = pixels.len() as u32;
    let (r, g, b) = pixels.iter().fold((0u32, 0u32, 0u32), |(r, g, b), p| {
        (r + p.r as u32, g + p.g as u32, b + p.b as u32)
    });

    GlowColor {
        r: (r / count) as u8,
        g: (g / count) as u8,
        b: (b / count) as u8,
    }
}

/// Scale each channel by `factor`, saturating at 255
fn boost_brightness(color: GlowColor, factor: f32) -> GlowColor {
    let boost = |c: u8| (c as f32 * factor).min(255.0) as u8;
    GlowColor {
        r: boost(color.r),
        g: boost(color.g),
        b: boost(color.b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_color() {
        let pixels = vec![
            GlowColor { r: 10, g: 20, b: 30 },
            GlowColor { r: 30, g: 40, b: 50 },
        ];
        assert_eq!(average_color(&pixels), GlowColor { r: 20, g: 30, b: 40 });
    }

    #[test]
    fn test_average_of_empty_frame_is_black() {
        assert_eq!(average_color(&[]), GlowColor { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn test_brightness_boost_saturates() {
        let boosted = boost_brightness(GlowColor { r: 100, g: 200, b: 255 }, 1.3);
        assert_eq!(boosted, GlowColor { r: 130, g: 255, b: 255 });
    }
}
