use crate::analysis::*;
use crate::components::*;
use crate::engine::*;
use leptos::prelude::*;
use leptos_meta::*;

const LOCAL_ANALYSIS_ID: &str = "local";

/// Places the tapped point on the first mistake still waiting for one.
fn place_tap(
	analysis: &mut AnalysisResult,
	point: NormalizedPoint,
) -> Option<AnnotationRequest> {
	let (id, _) = analysis.next_awaiting_tap()?;
	let index = analysis.mistakes.iter().position(Mistake::awaiting_tap)?;
	let highlight = &mut analysis.mistakes[index].highlight;
	highlight.x = Some(point.x);
	highlight.y = Some(point.y);
	Some(AnnotationRequest::from_tap(
		LOCAL_ANALYSIS_ID,
		id,
		point,
		highlight.shape,
	))
}

#[component]
pub fn Home() -> impl IntoView {
	let handle = match CanvasHandle::new(CanvasOptions::default()) {
		Ok(handle) => handle,
		Err(error) => {
			tracing::error!(%error, "failed to create canvas");
			return view! { <div class="Error">{error.to_string()}</div> }.into_any();
		}
	};
	use_history_shortcuts(handle.clone());

	let brush_color = RwSignal::new(DEFAULT_BRUSH_COLOR.to_string());
	let brush_size = RwSignal::new(DEFAULT_BRUSH_SIZE);
	let eraser = RwSignal::new(false);
	let annotation_mode = RwSignal::new(false);
	let analysis = RwSignal::new(None::<AnalysisResult>);
	let analysis_error = RwSignal::new(None::<String>);
	let selected = RwSignal::new(None::<String>);
	let requests = RwSignal::new(Vec::<AnnotationRequest>::new());
	let export_url = RwSignal::new(None::<String>);

	let overlays = Signal::derive(move || {
		analysis.with(|analysis| {
			analysis
				.as_ref()
				.map(|analysis| analysis.overlays(selected.get().as_deref()))
				.unwrap_or_default()
		})
	});
	let awaiting_tap = Signal::derive(move || {
		analysis.with(|analysis| {
			analysis
				.as_ref()
				.is_some_and(|analysis| analysis.next_awaiting_tap().is_some())
		})
	});

	let on_tap = Callback::new(move |point: NormalizedPoint| {
		let request = analysis
			.try_update(|analysis| analysis.as_mut().and_then(|a| place_tap(a, point)))
			.flatten();
		match request {
			Some(request) => {
				selected.set(Some(request.mistake_id.clone()));
				requests.update(|requests| requests.push(request));
			}
			None => tracing::debug!(?point, "tap with nothing to place"),
		}
	});

	let load_analysis = move |e| {
		let json = event_target_value(&e);
		if json.trim().is_empty() {
			analysis.set(None);
			analysis_error.set(None);
			return;
		}
		match AnalysisResult::from_json(&json) {
			Ok(result) => {
				analysis.set(Some(result));
				analysis_error.set(None);
			}
			Err(error) => analysis_error.set(Some(error.to_string())),
		}
	};

	let on_export = Callback::new(move |url: Option<String>| {
		if url.is_none() {
			tracing::warn!("nothing to export");
		}
		export_url.set(url);
	});

	view! {
		<Title text="Canvas"/>
		<div class="Home">
			<Toolbar
				handle=handle.clone()
				brush_color
				brush_size
				eraser
				annotation_mode
				on_export
			/>
			<div class="CanvasFrame" style="position:relative;height:70vh">
				<InkCanvasView
					handle
					brush_color
					brush_size
					eraser
					annotation_mode
					overlays
					awaiting_tap
					on_tap
				/>
			</div>
			{move || export_url.get().map(|url| view! {
				<a class="Download" href=url download="canvas.png">"Download PNG"</a>
			})}
			<textarea
				class="AnalysisInput"
				placeholder="Paste an analysis result"
				on:change=load_analysis
			></textarea>
			{move || analysis_error.get().map(|error| view! { <div class="Error">{error}</div> })}
			{move || analysis.with(|analysis| analysis.as_ref().map(|analysis| view! {
				<div class="Verdict">
					<b>{analysis.answer_verdict.to_string()}</b>
					" " {analysis.answer_verdict_reason.clone()}
				</div>
			}))}
			<ul class="Mistakes">
				{move || analysis.with(|analysis| {
					analysis.iter().flat_map(|analysis| analysis.mistakes.iter().enumerate()).map(|(index, mistake)| {
						let id = mistake.overlay_id(index);
						let select = {
							let id = id.clone();
							move |_| selected.set(Some(id.clone()))
						};
						let is_selected = move || selected.get().as_deref() == Some(id.as_str());
						view! {
							<li class:selected=is_selected on:click=select>
								<b>{mistake.kind.to_string()}</b>
								" (" {mistake.severity.to_string()} ") "
								{mistake.fix_instruction.clone()}
							</li>
						}
					}).collect_view()
				})}
			</ul>
			<pre class="AnnotationRequests">
				{move || requests.with(|requests| serde_json::to_string_pretty(requests).unwrap_or_default())}
			</pre>
		</div>
	}
	.into_any()
}
