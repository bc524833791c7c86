use super::CanvasHandle;
use leptos::prelude::*;

/// Binds undo and redo to the usual keyboard shortcuts for as long as the owner lives.
pub fn use_history_shortcuts(handle: CanvasHandle) {
	let keydown = move |e: leptos::ev::KeyboardEvent| {
		if e.repeat() || !(e.ctrl_key() || e.meta_key()) {
			return;
		}
		let handled = match (e.key().to_lowercase().as_str(), e.shift_key()) {
			("z", false) => handle.undo(),
			("z", true) | ("y", false) => handle.redo(),
			_ => return,
		};
		tracing::debug!(key = e.key(), handled, "history shortcut");
		e.prevent_default();
	};

	let keydown_handle = window_event_listener(leptos::ev::keydown, keydown);
	on_cleanup(move || keydown_handle.remove());
}
