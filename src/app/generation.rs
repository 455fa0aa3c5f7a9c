use super::StudioApp;
use crate::image::Preview;
use crate::studio::{GenerationOutput, StudioError};
use egui::Context;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

pub struct PendingGeneration {
    rx: Receiver<Result<GenerationOutput, StudioError>>,
    started_at: Instant,
}

impl StudioApp {
    pub(crate) fn is_generating(&self) -> bool {
        self.generation.is_some()
    }

    pub(crate) fn start_generation(&mut self) {
        if self.is_generating() {
            self.set_status("Generation already in progress.");
            return;
        }
        let job = match self.session.begin_generation() {
            Ok(job) => job,
            Err(err) => {
                tracing::info!(%err, "generation refused");
                self.set_status(err.to_string());
                return;
            }
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(job.run());
        });
        self.generation = Some(PendingGeneration {
            rx,
            started_at: Instant::now(),
        });
        self.set_status("Generating variants…");
    }

    pub(crate) fn poll_generation(&mut self, ctx: &Context) {
        let Some(job) = self.generation.take() else {
            return;
        };
        let result = match job.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                self.generation = Some(job);
                ctx.request_repaint();
                return;
            }
            Err(TryRecvError::Disconnected) => {
                self.set_status("Generation failed: worker disconnected.");
                return;
            }
        };
        let elapsed = job.started_at.elapsed();
        match self.session.finish_generation(result) {
            Ok(output) => {
                self.variants = output
                    .variants
                    .iter()
                    .map(|v| Preview::from_rgba(ctx, &format!("variant-{}", v.index), &v.image))
                    .collect();
                let count = output.variants.len();
                let remaining = self.session.usage().remaining();
                tracing::info!(count, ?elapsed, remaining, "generation finished");
                self.set_status(format!(
                    "Generated {count} variants in {:.1}s. {remaining} left today.",
                    elapsed.as_secs_f32()
                ));
            }
            Err(err) => {
                tracing::warn!(%err, "generation failed");
                self.set_status(err.to_string());
            }
        }
    }

    pub(crate) fn upscale_variant(&mut self, ctx: &Context, index: usize) {
        let mut limits = self.config.effective_image_limits();
        let texture_side = ctx.input(|i| i.max_texture_side);
        limits.image_dim = limits
            .image_dim
            .min(u32::try_from(texture_side).unwrap_or(u32::MAX));
        let (w, h) = match self.session.upscale_variant(index, &limits) {
            Ok(size) => size,
            Err(err) => {
                tracing::info!(index, %err, "upscale refused");
                self.set_status(err.to_string());
                return;
            }
        };
        if let (Some(output), Some(slot)) = (self.session.output(), self.variants.get_mut(index))
            && let Some(variant) = output.variants.get(index)
        {
            *slot = Preview::from_rgba(ctx, &format!("variant-{index}"), &variant.image);
        }
        tracing::info!(index, w, h, "variant upscaled");
        self.set_status(format!("Variant {} upscaled to {w}×{h}.", index + 1));
    }
}
