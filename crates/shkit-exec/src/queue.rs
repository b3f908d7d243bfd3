use std::collections::VecDeque;

use shkit_model::{CommandTemplate, JobInvocation};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// FIFO of pending invocations.
///
/// Every entry shares the queue's template (if any). Arguments are queued first,
/// lines read from an input stream after them, in arrival order.
#[derive(Debug, Default)]
pub struct JobQueue {
    template: Option<CommandTemplate>,
    pending: VecDeque<JobInvocation>,
}

impl JobQueue {
    pub fn new(template: Option<CommandTemplate>) -> Self {
        Self {
            template,
            pending: VecDeque::new(),
        }
    }

    pub fn template(&self) -> Option<&CommandTemplate> {
        self.template.as_ref()
    }

    pub fn push(&mut self, argument: impl Into<String>) {
        self.pending
            .push_back(JobInvocation::with_template(self.template.as_ref(), argument));
    }

    pub fn extend_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.push(arg);
        }
    }

    /// Queue one invocation per non-blank line of `reader`.
    ///
    /// Lines are taken verbatim apart from the line terminator (`\n` or `\r\n`).
    /// Invalid UTF-8 is replaced lossily. Returns the number of lines queued.
    pub async fn extend_from_reader<R>(&mut self, mut reader: R) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut added = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }
            self.push(line);
            added += 1;
        }
        Ok(added)
    }

    pub fn pop(&mut self) -> Option<JobInvocation> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn args_come_before_input_lines() {
        let mut q = JobQueue::new(None);
        q.extend_args(["a", "b"]);
        let added = q.extend_from_reader(&b"c\n\n   \nd\r\ne"[..]).await.unwrap();

        assert_eq!(added, 3);
        let order: Vec<_> = std::iter::from_fn(|| q.pop()).map(|j| j.argument).collect();
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn lines_keep_inner_whitespace() {
        let mut q = JobQueue::new(None);
        q.extend_from_reader(&b"  echo  two  \n"[..]).await.unwrap();
        assert_eq!(q.pop().unwrap().argument, "  echo  two  ");
    }

    #[test]
    fn template_is_applied_to_every_entry() {
        let t = CommandTemplate::new("gzip -9").unwrap();
        let mut q = JobQueue::new(Some(t.clone()));
        q.extend_args(["x.log", "y.log"]);

        assert_eq!(q.len(), 2);
        while let Some(job) = q.pop() {
            assert_eq!(job.template.as_ref(), Some(&t));
        }
        assert!(q.is_empty());
    }
}
