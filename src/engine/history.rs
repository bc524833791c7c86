use super::InkCanvas;
use tracing::instrument;

impl InkCanvas {
	/// Moves the most recent record to the redo stack. Ends any live session first.
	#[instrument(skip(self))]
	pub fn undo(&mut self) -> bool {
		self.end_session();
		let undone = self.model.undo();
		if undone {
			self.replay();
		}
		undone
	}

	#[instrument(skip(self))]
	pub fn redo(&mut self) -> bool {
		self.end_session();
		let redone = self.model.redo();
		if redone {
			self.replay();
		}
		redone
	}

	/// Empties both stacks and repaints the bare background.
	#[instrument(skip(self))]
	pub fn clear(&mut self) {
		self.end_session();
		self.model.clear();
		self.compositor.discard_pending();
		self.compositor.cancel_frame(self.scheduler.as_mut());
		self.replay();
	}

	pub fn can_undo(&self) -> bool {
		self.model.committed_count() > 0
	}

	pub fn can_redo(&self) -> bool {
		self.model.redo_count() > 0
	}
}
