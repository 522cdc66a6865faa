use eframe::egui::{Align2, RichText};
use egui_plot::{HLine, Line, LineStyle, MarkerShape, PlotPoint, PlotPoints, Points, PlotUi, Text, VLine};

use crate::config::plot::PLOT_CONFIG;
use crate::overlay::annotation::{Annotation, AnnotationKind, fibonacci_levels};
use crate::overlay::coords::{ChartTransform, PlotAdapter};
use crate::overlay::interaction::Interaction;
use crate::overlay::store::DrawingStore;
use crate::ui::plot_layers::{LayerContext, PlotLayer};
use crate::ui::utils::format_price;

/// Draws the committed annotations, the ghost preview and the draft
/// crosshair on top of the candle layers.
///
/// Trend lines are painted as free segments; horizontal levels and
/// Fibonacci retracements go through the plot's native `HLine` guide
/// primitive so they stay clipped and labelled with the chart. Any anchor
/// that fails projection silently skips its shape for this pass — it comes
/// back when the user scrolls the anchor into range.
pub struct OverlayLayer<'a> {
    pub store: &'a DrawingStore,
    pub interaction: &'a Interaction,
}

impl PlotLayer for OverlayLayer<'_> {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        let bounds = plot_ui.plot_bounds();
        let frame = plot_ui.response().rect;
        let tf = PlotAdapter::new(
            ctx.series,
            (*bounds.range_x().start(), *bounds.range_x().end()),
            (*bounds.range_y().start(), *bounds.range_y().end()),
            frame,
        );

        for ann in self.store.annotations() {
            let selected = self.store.selected() == Some(ann.id);
            match ann.kind {
                AnnotationKind::TrendLine => {
                    self.draw_trend_line(plot_ui, ctx, &tf, ann, selected);
                }
                AnnotationKind::HorizontalLine => {
                    let price = ann.anchors[0].price;
                    plot_ui.hline(
                        HLine::new(format_price(price), price)
                            .color(line_color(ann, selected))
                            .width(line_width(selected)),
                    );
                }
                AnnotationKind::Fibonacci => {
                    self.draw_fibonacci(plot_ui, ann, selected);
                }
            }
        }

        self.draw_ghost(plot_ui, ctx, &tf);
        self.draw_crosshair(plot_ui);
    }
}

impl OverlayLayer<'_> {
    fn draw_trend_line(
        &self,
        plot_ui: &mut PlotUi,
        ctx: &LayerContext,
        tf: &PlotAdapter<'_>,
        ann: &Annotation,
        selected: bool,
    ) {
        let a = &ann.anchors[0];
        let b = &ann.anchors[1];

        // Both endpoints must be representable on screen; a half-visible
        // segment is skipped whole rather than clamped.
        if tf.time_to_x(a.time_ms).is_none()
            || tf.time_to_x(b.time_ms).is_none()
            || tf.price_to_y(a.price).is_none()
            || tf.price_to_y(b.price).is_none()
        {
            return;
        }
        let (Some(xa), Some(xb)) = (
            ctx.series.index_of_time(a.time_ms),
            ctx.series.index_of_time(b.time_ms),
        ) else {
            return;
        };

        let color = line_color(ann, selected);
        plot_ui.line(
            Line::new("", PlotPoints::new(vec![[xa, a.price], [xb, b.price]]))
                .color(color)
                .width(line_width(selected)),
        );

        plot_ui.points(
            Points::new("", PlotPoints::new(vec![[xa, a.price], [xb, b.price]]))
                .shape(MarkerShape::Circle)
                .radius(if selected {
                    PLOT_CONFIG.anchor_marker_radius + 1.0
                } else {
                    PLOT_CONFIG.anchor_marker_radius
                })
                .color(color),
        );

        for (x, anchor) in [(xa, a), (xb, b)] {
            plot_ui.text(
                Text::new(
                    "",
                    PlotPoint::new(x, anchor.price),
                    RichText::new(format_price(anchor.price)).small().color(color),
                )
                .anchor(Align2::LEFT_BOTTOM),
            );
        }
    }

    fn draw_fibonacci(&self, plot_ui: &mut PlotUi, ann: &Annotation, selected: bool) {
        let color = line_color(ann, selected);
        for (ratio, price) in fibonacci_levels(&ann.anchors[0], &ann.anchors[1]) {
            let label = format!("{:.1}%  {}", ratio * 100.0, format_price(price));
            plot_ui.hline(
                HLine::new(label, price)
                    .color(color)
                    .width(line_width(selected))
                    .style(LineStyle::Dashed { length: 6.0 }),
            );
        }
    }

    /// Dashed preview from the draft's first anchor to the pointer. Only
    /// two-anchor kinds ever reach this state; horizontal levels commit on
    /// their first click.
    fn draw_ghost(&self, plot_ui: &mut PlotUi, ctx: &LayerContext, tf: &PlotAdapter<'_>) {
        let (Some(first), Some(ghost)) =
            (self.interaction.draft_anchor(), self.interaction.ghost())
        else {
            return;
        };
        if tf.price_to_y(first.price).is_none() || tf.price_to_y(ghost.price).is_none() {
            return;
        }
        let (Some(x0), Some(x1)) = (
            ctx.series.index_of_time(first.time_ms),
            ctx.series.index_of_time(ghost.time_ms),
        ) else {
            return;
        };

        plot_ui.line(
            Line::new("", PlotPoints::new(vec![[x0, first.price], [x1, ghost.price]]))
                .color(PLOT_CONFIG.ghost_color)
                .width(PLOT_CONFIG.annotation_line_width)
                .style(LineStyle::Dashed {
                    length: PLOT_CONFIG.ghost_dash_length,
                }),
        );
        plot_ui.text(
            Text::new(
                "",
                PlotPoint::new(x1, ghost.price),
                RichText::new(format_price(ghost.price))
                    .small()
                    .color(PLOT_CONFIG.ghost_color),
            )
            .anchor(Align2::LEFT_BOTTOM),
        );
    }

    /// Crosshair glyph replacing the chart's native cursor while a drawing
    /// tool is armed. The interaction machine tracks the pixel position;
    /// the plot coordinate comes from the plot itself so the glyph lands
    /// exactly under the pointer.
    fn draw_crosshair(&self, plot_ui: &mut PlotUi) {
        if !self.interaction.tool_armed() || self.interaction.cursor_px().is_none() {
            return;
        }
        let Some(pointer) = plot_ui.pointer_coordinate() else {
            return;
        };

        plot_ui.vline(
            VLine::new("", pointer.x)
                .color(PLOT_CONFIG.crosshair_color)
                .width(PLOT_CONFIG.crosshair_width),
        );
        plot_ui.hline(
            HLine::new("", pointer.y)
                .color(PLOT_CONFIG.crosshair_color)
                .width(PLOT_CONFIG.crosshair_width),
        );
    }
}

fn line_color(ann: &Annotation, selected: bool) -> eframe::egui::Color32 {
    if selected {
        PLOT_CONFIG.selected_color
    } else {
        ann.color
    }
}

fn line_width(selected: bool) -> f32 {
    if selected {
        PLOT_CONFIG.selected_line_width
    } else {
        PLOT_CONFIG.annotation_line_width
    }
}
