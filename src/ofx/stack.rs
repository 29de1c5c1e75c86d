#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Open,
    /// A leaf whose end tag was already written on its own line.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFrame {
    pub line_index: usize,
    pub name: String,
    pub status: FrameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseResolution {
    Matched {
        frame: TagFrame,
        /// Frames above the match that were thrown away unclosed.
        discarded: Vec<TagFrame>,
    },
    /// No open frame carries the name; the stack is left as it was.
    Unmatched,
}

/// Elements opened so far during one normalization pass.
#[derive(Debug, Default)]
pub struct NestingStack {
    frames: Vec<TagFrame>,
}

impl NestingStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line_index: usize, name: &str, status: FrameStatus) {
        self.frames.push(TagFrame {
            line_index,
            name: name.to_string(),
            status,
        });
    }

    /// Pops down to the nearest frame named `name`. Names compare exactly.
    pub fn resolve_close(&mut self, name: &str) -> CloseResolution {
        let Some(pos) = self.frames.iter().rposition(|frame| frame.name == name) else {
            return CloseResolution::Unmatched;
        };
        let discarded = self.frames.split_off(pos + 1);
        match self.frames.pop() {
            Some(frame) => CloseResolution::Matched { frame, discarded },
            None => CloseResolution::Unmatched,
        }
    }

    pub fn frames(&self) -> &[TagFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
