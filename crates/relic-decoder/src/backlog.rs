/// Decoded bytes that did not fit in the caller's last request.
///
/// The backlog is either absent or holds at least one undelivered byte.
/// Draining the last byte returns it to absent, so a drained backlog and a
/// never-filled one are indistinguishable.
#[derive(Debug, Default)]
pub(crate) struct Backlog {
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    bytes: Vec<u8>,
    start: usize,
}

impl Backlog {
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Undelivered byte count.
    pub(crate) fn len(&self) -> usize {
        self.pending
            .as_ref()
            .map_or(0, |p| p.bytes.len() - p.start)
    }

    /// Park `count` copies of `fill`. The backlog must be empty.
    pub(crate) fn stash_run(&mut self, fill: u8, count: usize) {
        debug_assert!(self.is_empty(), "backlog stashed while still pending");
        if count > 0 {
            self.pending = Some(Pending {
                bytes: vec![fill; count],
                start: 0,
            });
        }
    }

    /// Move as many pending bytes as fit into `out`, returning how many.
    pub(crate) fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let Some(pending) = self.pending.as_mut() else {
            return 0;
        };

        let remaining = &pending.bytes[pending.start..];
        let n = remaining.len().min(out.len());
        out[..n].copy_from_slice(&remaining[..n]);
        pending.start += n;

        if pending.start == pending.bytes.len() {
            self.pending = None;
        }
        n
    }
}
