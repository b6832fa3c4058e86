/// Last-write-wins buffer for transcripts arriving in a burst.
///
/// Every observation bumps the generation. A commit is only honoured for the
/// generation that armed it, so an older timer firing after a newer
/// transcript arrived does nothing and the newest text wins.
#[derive(Debug, Default)]
pub struct Coalescer {
    pending: Option<String>,
    generation: u64,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `text`, replacing anything pending. Returns the generation the
    /// caller should arm its timer with.
    pub fn observe(&mut self, text: String) -> u64 {
        self.pending = Some(text);
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Takes the pending text if `generation` is still the latest.
    pub fn take(&mut self, generation: u64) -> Option<String> {
        if generation != self.generation {
            return None;
        }
        self.pending.take()
    }

    /// Drops pending text. The generation keeps counting so timers armed
    /// before the clear can never match again.
    pub fn clear(&mut self) {
        self.pending = None;
        self.generation += 1;
    }
}
