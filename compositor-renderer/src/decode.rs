//! Background image decoding.
//!
//! Uploads are decoded off the event loop when a tokio runtime is available
//! and inline otherwise. Finished decodes are collected from an unbounded
//! channel by the owner of the document, which applies them in order.

use compositor_core::LayerId;
use tokio::sync::mpsc;

#[cfg(not(target_arch = "wasm32"))]
use crate::error::RenderError;
use crate::error::RenderResult;
use crate::image::{decode_image, DecodedImage};

/// A finished decode for one image layer.
#[derive(Debug)]
pub struct DecodeOutcome {
    /// Layer the pixels belong to.
    pub layer: LayerId,
    /// Decoded pixels or the decode error.
    pub result: RenderResult<DecodedImage>,
}

/// Sends the outcome of one spawned decode exactly once.
///
/// Dropping it unsent (the task was cancelled, for example by runtime
/// shutdown) reports a failed decode so the queue never waits on it.
#[cfg(not(target_arch = "wasm32"))]
struct DecodeTicket {
    layer: LayerId,
    sender: Option<mpsc::UnboundedSender<DecodeOutcome>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl DecodeTicket {
    fn finish(mut self, result: RenderResult<DecodedImage>) {
        self.send(result);
    }

    fn send(&mut self, result: RenderResult<DecodedImage>) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        let layer = self.layer;
        if sender.send(DecodeOutcome { layer, result }).is_err() {
            tracing::debug!("Decode queue dropped before layer {layer} finished");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for DecodeTicket {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::warn!("Decode task for layer {} was cancelled", self.layer);
            self.send(Err(RenderError::Decode("decode task cancelled".to_string())));
        }
    }
}

/// Queue of in-flight image decodes.
#[derive(Debug)]
pub struct DecodeQueue {
    sender: mpsc::UnboundedSender<DecodeOutcome>,
    receiver: mpsc::UnboundedReceiver<DecodeOutcome>,
    outstanding: usize,
}

impl Default for DecodeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            outstanding: 0,
        }
    }

    /// Submit `bytes` to be decoded for `layer`.
    ///
    /// Runs on tokio's blocking pool if called inside a runtime, otherwise
    /// decodes before returning.
    pub fn submit(&mut self, layer: LayerId, bytes: Vec<u8>) {
        self.outstanding += 1;
        let sender = self.sender.clone();

        #[cfg(not(target_arch = "wasm32"))]
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tracing::debug!("Decoding image for layer {layer} on blocking pool");
            let ticket = DecodeTicket {
                layer,
                sender: Some(sender),
            };
            handle.spawn(async move {
                let result = match tokio::task::spawn_blocking(move || decode_image(&bytes)).await
                {
                    Ok(result) => result,
                    Err(e) => Err(RenderError::Decode(format!("decode task failed: {e}"))),
                };
                ticket.finish(result);
            });
            return;
        }

        tracing::debug!("Decoding image for layer {layer} inline");
        let result = decode_image(&bytes);
        // The receiver lives in `self`, so this cannot fail.
        let _ = sender.send(DecodeOutcome { layer, result });
    }

    /// Take one finished decode without waiting.
    pub fn try_next(&mut self) -> Option<DecodeOutcome> {
        let outcome = self.receiver.try_recv().ok()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(outcome)
    }

    /// Take every decode that has finished so far.
    pub fn drain(&mut self) -> Vec<DecodeOutcome> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next decode to finish.
    ///
    /// Returns `None` immediately when nothing is outstanding. A decode whose
    /// task is cancelled before finishing, for example because its runtime
    /// shut down, still arrives here as a failed outcome.
    pub async fn next(&mut self) -> Option<DecodeOutcome> {
        if self.outstanding == 0 {
            return None;
        }
        let outcome = self.receiver.recv().await?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(outcome)
    }

    /// Number of decodes submitted but not yet taken.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Whether no decode is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.outstanding == 0
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::RenderError;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn test_inline_decode_without_runtime() {
        let mut queue = DecodeQueue::new();
        let layer = LayerId::new();
        queue.submit(layer, png_bytes(4, 3));

        assert_eq!(queue.outstanding(), 1);
        let outcome = queue.try_next().expect("decoded inline");
        assert_eq!(outcome.layer, layer);
        let image = outcome.result.expect("valid png");
        assert_eq!((image.width, image.height), (4, 3));
        assert!(queue.is_idle());
    }

    #[test]
    fn test_inline_failure_is_reported() {
        let mut queue = DecodeQueue::new();
        queue.submit(LayerId::new(), b"garbage".to_vec());
        let outcome = queue.drain().pop().expect("one outcome");
        assert!(matches!(outcome.result, Err(RenderError::Decode(_))));
    }

    #[tokio::test]
    async fn test_runtime_decode_is_awaitable() {
        let mut queue = DecodeQueue::new();
        let a = LayerId::new();
        let b = LayerId::new();
        queue.submit(a, png_bytes(2, 2));
        queue.submit(b, png_bytes(5, 5));

        let mut finished = Vec::new();
        while let Some(outcome) = queue.next().await {
            assert!(outcome.result.is_ok());
            finished.push(outcome.layer);
        }

        assert_eq!(finished.len(), 2);
        assert!(finished.contains(&a) && finished.contains(&b));
        assert!(queue.is_idle());
        assert!(queue.next().await.is_none());
    }

    #[test]
    fn test_runtime_shutdown_reports_cancelled_decode() {
        let mut queue = DecodeQueue::new();
        let layer = LayerId::new();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        {
            let _entered = runtime.enter();
            queue.submit(layer, png_bytes(2, 2));
        }
        // The spawned task never ran.
        drop(runtime);

        assert_eq!(queue.outstanding(), 1);
        let outcome = queue.try_next().expect("cancelled decode is reported");
        assert_eq!(outcome.layer, layer);
        assert!(matches!(outcome.result, Err(RenderError::Decode(_))));
        assert!(queue.is_idle());
    }
}
