use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::edge_geometry::{ARROW_SIZE, EDGE_WIDTH, EdgeCurve};
use super::interaction::{Interaction, Selection};
use super::state::{EditorState, HANDLE_RADIUS, handle_center};
use crate::geometry::{Point, Rect};
use crate::model::{NODE_HEIGHT, NODE_WIDTH, PersonNode, RelationshipEdge};

const BACKGROUND: &str = "#f7f7fb";
const EDGE_COLOR: &str = "#6b7280";
const SELECTED_COLOR: &str = "#7c3aed";
const CORNER_RADIUS: f64 = 10.0;

pub fn render(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.viewport.pan.x, state.viewport.pan.y);
	let _ = ctx.scale(state.viewport.zoom, state.viewport.zoom);
	draw_edges(state, ctx);
	draw_pending_connection(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport.zoom;
	for rel in &state.graph.relationships {
		let (Some(source), Some(target)) = (
			state.graph.person(&rel.source_id),
			state.graph.person(&rel.target_id),
		) else {
			continue;
		};
		let Some(curve) = EdgeCurve::between(source.center(), target.center()) else {
			continue;
		};
		let selected = state.selection == Selection::Edge(rel.id.clone());
		let color = if selected { SELECTED_COLOR } else { EDGE_COLOR };

		ctx.set_stroke_style_str(color);
		let width = if selected { EDGE_WIDTH * 1.5 } else { EDGE_WIDTH };
		ctx.set_line_width(width / k.max(0.5));
		ctx.begin_path();
		ctx.move_to(curve.start.x, curve.start.y);
		ctx.quadratic_curve_to(curve.control.x, curve.control.y, curve.end.x, curve.end.y);
		ctx.stroke();

		if rel.directed {
			let [tip, left, right] = curve.arrowhead(&target.bounds(), ARROW_SIZE);
			ctx.set_fill_style_str(color);
			ctx.begin_path();
			ctx.move_to(tip.x, tip.y);
			ctx.line_to(left.x, left.y);
			ctx.line_to(right.x, right.y);
			ctx.close_path();
			ctx.fill();
		}

		draw_edge_label(ctx, rel, curve.label_anchor(), selected);
	}
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, rel: &RelationshipEdge, at: Point, selected: bool) {
	if rel.label.is_empty() {
		return;
	}
	ctx.set_font("11px sans-serif");
	let text_w = ctx
		.measure_text(&rel.label)
		.map(|m| m.width())
		.unwrap_or(rel.label.chars().count() as f64 * 6.0);
	let (w, h) = (text_w + 16.0, 20.0);
	let pill = Rect::new(at.x - w / 2.0, at.y - h / 2.0, w, h);

	rounded_rect(ctx, &pill, h / 2.0);
	ctx.set_fill_style_str("white");
	ctx.fill();
	ctx.set_stroke_style_str(if selected { SELECTED_COLOR } else { "#d1d5db" });
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.set_fill_style_str("#374151");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&rel.label, at.x, at.y);
}

fn draw_pending_connection(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	let Interaction::Connecting { source_id, pointer } = &state.interaction else {
		return;
	};
	let Some(source) = state.graph.person(source_id) else {
		return;
	};
	let k = state.viewport.zoom;
	let from = source.center();
	ctx.set_stroke_style_str(SELECTED_COLOR);
	ctx.set_line_width(EDGE_WIDTH / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(pointer.x, pointer.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport.zoom;
	let connecting = matches!(state.interaction, Interaction::Connecting { .. });
	for person in &state.graph.persons {
		let selected = state.selection == Selection::Node(person.id.clone());
		let hovered = state.hover.as_deref() == Some(person.id.as_str());
		let bounds = person.bounds();

		rounded_rect(ctx, &bounds, CORNER_RADIUS);
		ctx.set_fill_style_str("white");
		ctx.fill();
		ctx.set_stroke_style_str(if selected { SELECTED_COLOR } else { person.role.color() });
		let border = if selected { 3.0 } else { 1.5 };
		ctx.set_line_width(border / k.max(0.5));
		ctx.stroke();

		// Role stripe.
		ctx.set_fill_style_str(person.role.color());
		ctx.fill_rect(bounds.x + 8.0, bounds.y + 10.0, 4.0, NODE_HEIGHT - 20.0);

		draw_node_text(ctx, person);

		if selected || hovered || connecting {
			let c = handle_center(person);
			ctx.begin_path();
			let _ = ctx.arc(c.x, c.y, HANDLE_RADIUS, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(person.role.color());
			ctx.fill();
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(2.0 / k.max(0.5));
			ctx.stroke();
		}
	}
}

fn draw_node_text(ctx: &CanvasRenderingContext2d, person: &PersonNode) {
	let left = person.x + 20.0;
	ctx.set_text_align("left");
	ctx.set_text_baseline("alphabetic");
	ctx.set_fill_style_str("#111827");
	ctx.set_font("bold 13px sans-serif");
	let _ = ctx.fill_text_with_max_width(&person.name, left, person.y + 24.0, NODE_WIDTH - 28.0);
	ctx.set_fill_style_str("#6b7280");
	ctx.set_font("11px sans-serif");
	let _ = ctx.fill_text(person.role.label(), left, person.y + 42.0);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, r: &Rect, radius: f64) {
	let radius = radius.min(r.width / 2.0).min(r.height / 2.0);
	let (x0, y0, x1, y1) = (r.x, r.y, r.x + r.width, r.y + r.height);
	ctx.begin_path();
	ctx.move_to(x0 + radius, y0);
	let _ = ctx.arc_to(x1, y0, x1, y1, radius);
	let _ = ctx.arc_to(x1, y1, x0, y1, radius);
	let _ = ctx.arc_to(x0, y1, x0, y0, radius);
	let _ = ctx.arc_to(x0, y0, x1, y0, radius);
	ctx.close_path();
}
