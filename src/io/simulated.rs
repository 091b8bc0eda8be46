use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::Sleep;

use crate::source::BoxedReader;

pin_project! {
    /// Reader that sleeps before some or all of its reads
    ///
    /// With probability 1.0 every read is delayed (a slow source); lower
    /// values delay a random share of reads (a flaky source). The stall is
    /// decided and started when a read begins, so idle time between reads
    /// never counts towards it.
    pub struct DelayedReader<R> {
        #[pin]
        inner: R,
        sleep: Option<Pin<Box<Sleep>>>,
        delay: Duration,
        probability: f64,
        in_read: bool,
    }
}

impl<R> DelayedReader<R>
where
    R: AsyncRead,
{
    /// Delay every read by `delay`
    pub fn slow(inner: R, delay: Duration) -> Self {
        Self::flaky(inner, delay, 1.0)
    }

    /// Delay each read by `delay` with the given probability
    pub fn flaky(inner: R, delay: Duration, probability: f64) -> Self {
        Self {
            inner,
            sleep: None,
            delay,
            probability: probability.clamp(0.0, 1.0),
            in_read: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

fn roll(probability: f64) -> bool {
    probability >= 1.0 || (probability > 0.0 && fastrand::f64() < probability)
}

impl<R> AsyncRead for DelayedReader<R>
where
    R: AsyncRead,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();

        // First poll of a new read
        if !*this.in_read {
            *this.in_read = true;
            if roll(*this.probability) {
                *this.sleep = Some(Box::pin(tokio::time::sleep(*this.delay)));
            }
        }

        if let Some(sleep) = this.sleep.as_mut() {
            ready!(sleep.as_mut().poll(cx));
        }
        *this.sleep = None;

        let result = ready!(this.inner.poll_read(cx, buf));
        *this.in_read = false;
        Poll::Ready(result)
    }
}

/// Sources for the demo mode: `n` fast and `n` flaky ones, interleaved
///
/// Fast source `i` yields `Reader #i`; flaky source `i` yields
/// `SlowAndFlaky #i` and stalls for `delay` on half of its reads.
pub fn demo_sources(n: usize, delay: Duration) -> Vec<BoxedReader> {
    let mut sources: Vec<BoxedReader> = Vec::with_capacity(n * 2);
    for i in 0..n {
        let good = format!("Reader #{i}\n").into_bytes();
        let flaky = format!("SlowAndFlaky #{i}\n").into_bytes();
        sources.push(Box::new(io::Cursor::new(good)));
        sources.push(Box::new(DelayedReader::flaky(
            io::Cursor::new(flaky),
            delay,
            0.5,
        )));
    }
    sources
}
