use crate::engine::{layout_overlays, CanvasOverlay};
use glam::Vec2;
use leptos::prelude::*;

/// Highlight markers drawn above the canvas, independent of its pixels.
#[component]
pub fn OverlayLayer(
	#[prop(into)] overlays: Signal<Vec<CanvasOverlay>>,
	#[prop(into)] container: Signal<Vec2>,
) -> impl IntoView {
	let placements = move || overlays.with(|overlays| layout_overlays(overlays, container.get()));
	view! {
		<div class="OverlayLayer" style="position:absolute;inset:0;pointer-events:none">
			{move || {
				placements()
					.into_iter()
					.map(|placement| {
						view! {
							<div class="Overlay" data-overlay-id=placement.id.clone() style=placement.css()></div>
						}
					})
					.collect_view()
			}}
		</div>
	}
}
