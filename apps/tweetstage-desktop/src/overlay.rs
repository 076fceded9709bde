use tweetstage_scene::TextOverlay;

/// Where an overlay lands on screen, in egui points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Horizontal centre of the text.
    pub x: f32,
    /// Baseline of the text.
    pub y: f32,
    pub font_size: f32,
}

/// Map overlay coordinates onto a `width` x `height` screen.
///
/// Overlay y spans `[-1, 1]` bottom to top; x is scaled by the aspect ratio
/// so `[-aspect, aspect]` spans left to right. Text is centred on the
/// position and sits on it.
pub fn place(overlay: &TextOverlay, width: f32, height: f32) -> Placement {
    let height = height.max(1.0);
    let aspect = width.max(1.0) / height;
    let font_size = overlay.scale * height / 2.0;
    Placement {
        x: (overlay.position.x / aspect + 1.0) / 2.0 * width,
        y: (1.0 - overlay.position.y) / 2.0 * height,
        font_size,
    }
}

/// Draw every overlay as a non-interactive label.
pub fn draw(ctx: &egui::Context, overlays: &[TextOverlay]) {
    let screen = ctx.screen_rect();
    for (i, overlay) in overlays.iter().enumerate() {
        let at = place(overlay, screen.width(), screen.height());
        egui::Area::new(egui::Id::new(("overlay", i)))
            .pivot(egui::Align2::CENTER_BOTTOM)
            .fixed_pos(egui::pos2(at.x, at.y))
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_max_width(screen.width() * 0.9);
                ui.label(
                    egui::RichText::new(&overlay.text)
                        .size(at.font_size)
                        .color(egui::Color32::WHITE),
                );
            });
    }
}
