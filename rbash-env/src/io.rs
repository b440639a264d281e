//! Output sinks.
//!
//! Design note 5 models a sink as a first-class function, `fn(tag, bytes)`,
//! composing filters/retags/tees without an inheritance hierarchy. This
//! module is new relative to the teacher (which instead threads a
//! `SharedSystem`/real file descriptor through everything, since upstream
//! yash always ends up writing to a real terminal or file); it is grounded
//! on the teacher's general preference for trait objects over enums for
//! open-ended behavior (`yash_env::system::System`), applied to the
//! function-shaped interface the design note asks for instead.

use std::cell::RefCell;
use std::io::Write as _;
use std::rc::Rc;

/// Which output stream a chunk of bytes belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StreamTag {
    Stdout,
    Stderr,
}

/// A consumer of tagged byte chunks. The only interface for emitting shell
/// output, so that redirections can be implemented purely by substituting
/// one sink for another around a command's execution.
pub type Sink = Rc<dyn Fn(StreamTag, &[u8])>;

/// A sink that appends every chunk it sees to an in-memory buffer, tagged
/// separately — the default collector the external interfaces section
/// names (`{stdout_bytes, stderr_bytes}`).
#[derive(Clone, Default)]
pub struct Collector {
    pub stdout: Rc<RefCell<Vec<u8>>>,
    pub stderr: Rc<RefCell<Vec<u8>>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> Sink {
        let stdout = Rc::clone(&self.stdout);
        let stderr = Rc::clone(&self.stderr);
        Rc::new(move |tag, bytes| {
            let buf = match tag {
                StreamTag::Stdout => &stdout,
                StreamTag::Stderr => &stderr,
            };
            buf.borrow_mut().extend_from_slice(bytes);
        })
    }
}

/// Wraps `inner` so that chunks tagged `from` are retagged `to` before
/// being forwarded. Implements redirections like `2>&1` (retag stderr as
/// stdout) and `1>&2`.
pub fn retag(inner: Sink, from: StreamTag, to: StreamTag) -> Sink {
    Rc::new(move |tag, bytes| {
        let effective = if tag == from { to } else { tag };
        inner(effective, bytes);
    })
}

/// Wraps `inner` so that every chunk is also forwarded to `other`,
/// implementing `&>`/`&>>`'s single-file tee of both streams.
pub fn tee(inner: Sink, other: Sink) -> Sink {
    Rc::new(move |tag, bytes| {
        inner(tag, bytes);
        other(tag, bytes);
    })
}

/// Wraps `inner` so that only chunks matching `tag` pass through; used to
/// build a sink pair out of one retagging sink per stream.
pub fn filter(inner: Sink, tag: StreamTag) -> Sink {
    Rc::new(move |t, bytes| {
        if t == tag {
            inner(t, bytes);
        }
    })
}

/// A sink that writes `Stdout`-tagged chunks to the process's real stdout
/// and `Stderr`-tagged chunks to its real stderr, flushing after every
/// write. This is the sink `rbash-cli` installs at process startup; every
/// other sink constructor in this module exists to be composed in front of
/// one of these (or a [`Collector`]'s, for tests).
pub fn fd_sink() -> Sink {
    Rc::new(move |tag, bytes| {
        let mut stdout;
        let mut stderr;
        let writer: &mut dyn std::io::Write = match tag {
            StreamTag::Stdout => {
                stdout = std::io::stdout();
                &mut stdout
            }
            StreamTag::Stderr => {
                stderr = std::io::stderr();
                &mut stderr
            }
        };
        let _ = writer.write_all(bytes);
        let _ = writer.flush();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_separates_streams() {
        let collector = Collector::new();
        let sink = collector.sink();
        sink(StreamTag::Stdout, b"out");
        sink(StreamTag::Stderr, b"err");
        assert_eq!(&*collector.stdout.borrow(), b"out");
        assert_eq!(&*collector.stderr.borrow(), b"err");
    }

    #[test]
    fn retag_redirects_stderr_to_stdout() {
        let collector = Collector::new();
        let sink = retag(collector.sink(), StreamTag::Stderr, StreamTag::Stdout);
        sink(StreamTag::Stderr, b"oops");
        assert_eq!(&*collector.stdout.borrow(), b"oops");
        assert!(collector.stderr.borrow().is_empty());
    }

    #[test]
    fn tee_duplicates_to_both_sinks() {
        let a = Collector::new();
        let b = Collector::new();
        let sink = tee(a.sink(), b.sink());
        sink(StreamTag::Stdout, b"hi");
        assert_eq!(&*a.stdout.borrow(), b"hi");
        assert_eq!(&*b.stdout.borrow(), b"hi");
    }
}
