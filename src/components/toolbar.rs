use super::{BrushSetting, CanvasHandle};
use crate::util::encode_data_url;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn Toolbar(
	handle: CanvasHandle,
	brush_color: RwSignal<String>,
	brush_size: RwSignal<f32>,
	eraser: RwSignal<bool>,
	annotation_mode: RwSignal<bool>,
	/// Receives the exported image as a data URL, or `None` when there was nothing to export.
	on_export: Callback<Option<String>>,
) -> impl IntoView {
	let revision = handle.revision();
	let can_undo = {
		let handle = handle.clone();
		move || {
			revision.track();
			handle.with(|canvas| canvas.can_undo())
		}
	};
	let can_redo = {
		let handle = handle.clone();
		move || {
			revision.track();
			handle.with(|canvas| canvas.can_redo())
		}
	};

	let undo = {
		let handle = handle.clone();
		move |_| {
			handle.undo();
		}
	};
	let redo = {
		let handle = handle.clone();
		move |_| {
			handle.redo();
		}
	};
	let clear = {
		let handle = handle.clone();
		move |_| handle.clear()
	};
	let export = move |_| {
		let png = handle.export_png();
		spawn_local(async move {
			let url = png
				.await
				.map(|png| encode_data_url(&png, Some("image/png")));
			on_export.run(url);
		});
	};

	view! {
		<div class="Toolbar">
			<BrushSetting name="Color">
				<input
					type="color"
					prop:value=move || brush_color.get()
					on:input=move |e| brush_color.set(event_target_value(&e))
				/>
			</BrushSetting>
			<BrushSetting name="Size">
				<input
					type="range"
					min="0.5"
					max="24"
					step="0.5"
					prop:value=move || brush_size.get().to_string()
					on:input=move |e| {
						if let Ok(size) = event_target_value(&e).parse() {
							brush_size.set(size);
						}
					}
				/>
			</BrushSetting>
			<BrushSetting name="Eraser">
				<input
					type="checkbox"
					prop:checked=move || eraser.get()
					on:change=move |e| eraser.set(event_target_checked(&e))
				/>
			</BrushSetting>
			<BrushSetting name="Annotate">
				<input
					type="checkbox"
					prop:checked=move || annotation_mode.get()
					on:change=move |e| annotation_mode.set(event_target_checked(&e))
				/>
			</BrushSetting>
			<button on:click=undo disabled=move || !can_undo()>"Undo"</button>
			<button on:click=redo disabled=move || !can_redo()>"Redo"</button>
			<button on:click=clear>"Clear"</button>
			<button on:click=export>"Export"</button>
		</div>
	}
}
