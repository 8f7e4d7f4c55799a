use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::controller::EditorController;
use super::dialogs::{person_dialog, relationship_dialog};
use super::interaction::{PointerButton, Selection};
use super::layout::LayoutOptions;
use super::types::LoadStatus;
use crate::api::RelationshipApi;
use crate::config::AppConfig;
use crate::geometry::Point;

/// Canvas size follows the parent element.
fn fit_canvas(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0));
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	(w, h)
}

/// Interactive person/relationship diagram for one case.
#[component]
pub fn RelationshipGraphEditor(#[prop(into)] case_id: String) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let controller = EditorController::new(
		RelationshipApi::new(&config.api_base_url, &case_id),
		LayoutOptions::default(),
	);
	let signals = controller.signals;
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let frame: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

	// Stop the frame loop and detach window listeners on unmount.
	let teardown = SendWrapper::new({
		let (ctl, animate, resize_cb, frame) =
			(controller.clone(), animate.clone(), resize_cb.clone(), frame.clone());
		move || {
			ctl.unmount();
			let window = web_sys::window();
			if let (Some(window), Some(id)) = (&window, frame.take()) {
				let _ = window.cancel_animation_frame(id);
			}
			if let (Some(window), Some(cb)) = (&window, resize_cb.borrow_mut().take()) {
				let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			animate.borrow_mut().take();
		}
	});
	on_cleanup(move || (teardown.take())());

	let (ctl_init, animate_init, resize_cb_init, frame_init) =
		(controller.clone(), animate.clone(), resize_cb.clone(), frame.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = fit_canvas(&canvas);
		ctl_init.set_size(w, h);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("canvas 2d context unavailable");
			return;
		};
		ctl_init.load();

		let (ctl_resize, canvas_resize) = (ctl_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			if ctl_resize.is_mounted() {
				let (nw, nh) = fit_canvas(&canvas_resize);
				ctl_resize.set_size(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (ctl_anim, animate_inner, frame_inner) =
			(ctl_init.clone(), animate_init.clone(), frame_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			frame_inner.set(None);
			if !ctl_anim.is_mounted() {
				return;
			}
			ctl_anim.render(&ctx);
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let screen_point = move |ev: &MouseEvent| -> Option<Point> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some(Point::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};
	let show_cursor = move |ctl: &EditorController| {
		if let Some(canvas) = canvas_ref.get() {
			let canvas: HtmlCanvasElement = canvas.into();
			let _ = HtmlElement::style(&canvas).set_property("cursor", ctl.cursor());
		}
	};

	let ctl_md = controller.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = screen_point(&ev) else {
			return;
		};
		let button = PointerButton::from(ev.button());
		if button == PointerButton::Middle {
			ev.prevent_default();
		}
		ctl_md.pointer_down(p, button);
		show_cursor(&ctl_md);
	};

	let ctl_mm = controller.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(p) = screen_point(&ev) {
			ctl_mm.pointer_move(p);
		}
	};

	let ctl_mu = controller.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some(p) = screen_point(&ev) {
			ctl_mu.pointer_up(p);
		}
		show_cursor(&ctl_mu);
	};

	let ctl_ml = controller.clone();
	let on_mouseleave = move |_: MouseEvent| {
		ctl_ml.pointer_leave();
		show_cursor(&ctl_ml);
	};

	let ctl_dc = controller.clone();
	let on_dblclick = move |ev: MouseEvent| {
		if let Some(p) = screen_point(&ev) {
			ctl_dc.edit_at(p);
		}
	};

	let ctl_wh = controller.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = screen_point(&ev) {
			ctl_wh.wheel(p, ev.delta_y());
		}
	};

	let (ctl_add, ctl_edit, ctl_delete, ctl_fit, ctl_in, ctl_out, ctl_reload, ctl_retry) = (
		controller.clone(),
		controller.clone(),
		controller.clone(),
		controller.clone(),
		controller.clone(),
		controller.clone(),
		controller.clone(),
		controller.clone(),
	);
	let nothing_selected = move || signals.selection.get() == Selection::None;

	view! {
		<div class="relationship-editor">
			<div class="editor-toolbar">
				<button on:click=move |_| ctl_add.open_add_person()>"Add person"</button>
				<button disabled=nothing_selected on:click=move |_| ctl_edit.open_edit_selected()>
					"Edit"
				</button>
				<button disabled=nothing_selected on:click=move |_| ctl_delete.delete_selected()>
					"Delete"
				</button>
				<span class="editor-selection">{move || signals.selected_label.get()}</span>
				<span class="editor-spacer"></span>
				<button on:click=move |_| ctl_out.zoom_by(0.9)>"−"</button>
				<button on:click=move |_| ctl_in.zoom_by(1.1)>"+"</button>
				<button on:click=move |_| ctl_fit.fit_view()>"Fit"</button>
				<button on:click=move |_| ctl_reload.load()>"Reload"</button>
			</div>
			<div class="editor-canvas-wrap">
				<canvas
					node_ref=canvas_ref
					class="relationship-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:dblclick=on_dblclick
					on:wheel=on_wheel
					on:contextmenu=|ev: MouseEvent| ev.prevent_default()
					style="display: block;"
				/>
				<div
					class="editor-overlay"
					style:display=move || {
						if signals.status.get() == LoadStatus::Loading { "flex" } else { "none" }
					}
				>
					"Loading relationships…"
				</div>
				<div
					class="editor-error"
					style:display=move || {
						if matches!(signals.status.get(), LoadStatus::Failed(_)) { "flex" } else { "none" }
					}
				>
					<p>"Could not load the relationship graph."</p>
					<p class="editor-error-detail">
						{move || match signals.status.get() {
							LoadStatus::Failed(message) => message,
							_ => String::new(),
						}}
					</p>
					<button on:click=move |_| ctl_retry.load()>"Retry"</button>
				</div>
			</div>
			{person_dialog(controller.clone())}
			{relationship_dialog(controller)}
		</div>
	}
}
