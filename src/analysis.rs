//! Wire types for the grading backend and their mapping onto canvas markers.
//!
//! The backend receives the exported canvas and answers with an [`AnalysisResult`]. Highlights
//! with coordinates become [`CanvasOverlay`] markers. Highlights the backend could not place are
//! placed by tapping the canvas, which produces an [`AnnotationRequest`].

use crate::engine::{CanvasOverlay, NormalizedPoint, OverlayShape};
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
	#[default]
	#[display("tap")]
	Tap,
	#[display("ocr_box")]
	OcrBox,
	#[display("region_box")]
	RegionBox,
}

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightShape {
	#[default]
	#[display("circle")]
	Circle,
	#[display("box")]
	Box,
}

impl From<HighlightShape> for OverlayShape {
	fn from(shape: HighlightShape) -> Self {
		match shape {
			HighlightShape::Circle => OverlayShape::Circle,
			HighlightShape::Box => OverlayShape::Box,
		}
	}
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	#[display("low")]
	Low,
	#[display("med")]
	Med,
	#[display("high")]
	High,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MistakeType {
	#[display("CONDITION_MISSED")]
	ConditionMissed,
	#[display("SIGN_ERROR")]
	SignError,
	#[display("UNIT_ERROR")]
	UnitError,
	#[display("DEFINITION_CONFUSION")]
	DefinitionConfusion,
	#[display("ALGEBRA_ERROR")]
	AlgebraError,
	#[display("LOGIC_GAP")]
	LogicGap,
	#[display("CASE_MISS")]
	CaseMiss,
	#[display("GRAPH_MISREAD")]
	GraphMisread,
	#[display("ARITHMETIC_ERROR")]
	ArithmeticError,
	#[display("FINAL_FORM_ERROR")]
	FinalFormError,
}

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerVerdict {
	#[display("correct")]
	Correct,
	#[display("incorrect")]
	Incorrect,
	#[default]
	#[display("unknown")]
	Unknown,
}

/// Where a mistake is on the page, in normalized coordinates when known.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Highlight {
	pub mode: HighlightMode,
	pub shape: HighlightShape,
	pub x: Option<f32>,
	pub y: Option<f32>,
	pub w: Option<f32>,
	pub h: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mistake_id: Option<String>,
	#[serde(rename = "type")]
	pub kind: MistakeType,
	pub severity: Severity,
	pub points_deducted: f32,
	pub evidence: String,
	pub fix_instruction: String,
	pub location_hint: String,
	#[serde(default)]
	pub highlight: Highlight,
}

impl Mistake {
	/// The backend's id, or one derived from the mistake's position in the result.
	pub fn overlay_id(&self, index: usize) -> String {
		self.mistake_id
			.clone()
			.unwrap_or_else(|| format!("mistake-{index}"))
	}

	/// Whether the user still has to tap to place this mistake's marker.
	pub fn awaiting_tap(&self) -> bool {
		self.highlight.mode == HighlightMode::Tap
			&& (self.highlight.x.is_none() || self.highlight.y.is_none())
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricScores {
	pub conditions: f32,
	pub modeling: f32,
	pub logic: f32,
	pub calculation: f32,
	#[serde(rename = "final")]
	pub final_: f32,
}

impl RubricScores {
	pub fn total(&self) -> f32 {
		self.conditions + self.modeling + self.logic + self.calculation + self.final_
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchChange {
	pub change: String,
	pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
	pub minimal_changes: Vec<PatchChange>,
	pub patched_solution_brief: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
	pub score_total: f32,
	pub rubric_scores: RubricScores,
	pub mistakes: Vec<Mistake>,
	pub patch: Patch,
	pub next_checklist: Vec<String>,
	pub confidence: f32,
	#[serde(default)]
	pub missing_info: Vec<String>,
	pub answer_verdict: AnswerVerdict,
	pub answer_verdict_reason: String,
}

impl AnalysisResult {
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}

	pub fn overlays(&self, selected: Option<&str>) -> Vec<CanvasOverlay> {
		overlays_from_mistakes(&self.mistakes, selected)
	}

	/// The first mistake that still needs a tap.
	pub fn next_awaiting_tap(&self) -> Option<(String, &Mistake)> {
		self.mistakes
			.iter()
			.enumerate()
			.find(|(_, mistake)| mistake.awaiting_tap())
			.map(|(index, mistake)| (mistake.overlay_id(index), mistake))
	}
}

/// One marker per mistake whose highlight has both coordinates.
pub fn overlays_from_mistakes(mistakes: &[Mistake], selected: Option<&str>) -> Vec<CanvasOverlay> {
	mistakes
		.iter()
		.enumerate()
		.filter_map(|(index, mistake)| {
			let highlight = &mistake.highlight;
			let (x, y) = (highlight.x?, highlight.y?);
			let id = mistake.overlay_id(index);
			Some(CanvasOverlay {
				selected: selected == Some(id.as_str()),
				id,
				x,
				y,
				w: highlight.w.unwrap_or(0.0),
				h: highlight.h.unwrap_or(0.0),
				shape: highlight.shape.into(),
			})
		})
		.collect()
}

/// Records where the user tapped for one mistake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRequest {
	pub analysis_id: String,
	pub mistake_id: String,
	pub mode: HighlightMode,
	#[serde(default)]
	pub shape: HighlightShape,
	pub x: Option<f32>,
	pub y: Option<f32>,
	pub w: Option<f32>,
	pub h: Option<f32>,
}

impl AnnotationRequest {
	pub fn from_tap(
		analysis_id: impl Into<String>,
		mistake_id: impl Into<String>,
		point: NormalizedPoint,
		shape: HighlightShape,
	) -> Self {
		Self {
			analysis_id: analysis_id.into(),
			mistake_id: mistake_id.into(),
			mode: HighlightMode::Tap,
			shape,
			x: Some(point.x),
			y: Some(point.y),
			w: None,
			h: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const RESULT: &str = r#"{
		"score_total": 6.5,
		"rubric_scores": {"conditions": 2, "modeling": 1.5, "logic": 1, "calculation": 1, "final": 1},
		"mistakes": [
			{
				"mistake_id": "m1",
				"type": "SIGN_ERROR",
				"severity": "high",
				"points_deducted": 1.5,
				"evidence": "x = -3",
				"fix_instruction": "flip the sign",
				"location_hint": "line 3",
				"highlight": {"mode": "region_box", "shape": "box", "x": 0.4, "y": 0.3, "w": 0.2, "h": 0.1}
			},
			{
				"type": "UNIT_ERROR",
				"severity": "low",
				"points_deducted": 0.5,
				"evidence": "m/s^2",
				"fix_instruction": "use m/s",
				"location_hint": "answer",
				"highlight": {"mode": "tap", "shape": "circle", "x": null, "y": null, "w": null, "h": null}
			},
			{
				"type": "LOGIC_GAP",
				"severity": "med",
				"points_deducted": 1,
				"evidence": "jump",
				"fix_instruction": "justify",
				"location_hint": "line 5",
				"highlight": {"mode": "tap", "shape": "circle", "x": 0.7, "y": 0.8, "w": null, "h": null}
			}
		],
		"patch": {
			"minimal_changes": [{"change": "x = 3", "rationale": "sign"}],
			"patched_solution_brief": "fix line 3"
		},
		"next_checklist": ["check signs"],
		"confidence": 0.8,
		"answer_verdict": "incorrect",
		"answer_verdict_reason": "sign flipped in line 3"
	}"#;

	#[test]
	fn parses_backend_result() {
		let result = AnalysisResult::from_json(RESULT).unwrap();
		assert_eq!(result.mistakes.len(), 3);
		assert_eq!(result.mistakes[0].kind, MistakeType::SignError);
		assert_eq!(result.mistakes[2].severity, Severity::Med);
		assert_eq!(result.rubric_scores.total(), 6.5);
		assert!(result.missing_info.is_empty());
		assert_eq!(result.answer_verdict, AnswerVerdict::Incorrect);
		assert_eq!(result.answer_verdict_reason, "sign flipped in line 3");
	}

	#[test]
	fn verdict_is_required() {
		let mut json: serde_json::Value = serde_json::from_str(RESULT).unwrap();
		json.as_object_mut().unwrap().remove("answer_verdict");
		assert!(AnalysisResult::from_json(&json.to_string()).is_err());

		json["answer_verdict"] = "maybe".into();
		assert!(AnalysisResult::from_json(&json.to_string()).is_err());
	}

	#[test]
	fn overlays_skip_unplaced_mistakes() {
		let result = AnalysisResult::from_json(RESULT).unwrap();
		let overlays = result.overlays(Some("mistake-2"));
		assert_eq!(overlays.len(), 2);
		assert_eq!(overlays[0].id, "m1");
		assert_eq!(overlays[0].shape, OverlayShape::Box);
		assert!(!overlays[0].selected);
		assert_eq!(overlays[1].id, "mistake-2");
		assert_eq!((overlays[1].w, overlays[1].h), (0.0, 0.0));
		assert!(overlays[1].selected);
	}

	#[test]
	fn unplaced_tap_mistake_waits_for_a_tap() {
		let result = AnalysisResult::from_json(RESULT).unwrap();
		let (id, mistake) = result.next_awaiting_tap().unwrap();
		assert_eq!(id, "mistake-1");
		assert_eq!(mistake.kind, MistakeType::UnitError);
		assert!(!result.mistakes[0].awaiting_tap());
	}

	#[test]
	fn tap_becomes_annotation_request() {
		let request = AnnotationRequest::from_tap(
			"a1",
			"mistake-1",
			NormalizedPoint { x: 0.25, y: 0.5 },
			HighlightShape::Circle,
		);
		let json = serde_json::to_value(&request).unwrap();
		assert_eq!(json["mode"], "tap");
		assert_eq!(json["shape"], "circle");
		assert_eq!(json["x"], 0.25);
		assert!(json["w"].is_null());
	}
}
