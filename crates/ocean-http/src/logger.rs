//! Long-lived consumer that drains trace streams into the log.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::record::TraceRecord;
use crate::tracer::TraceStreams;

/// Spawns the task that writes every trace record through `tracing`.
///
/// The task ends once the tracer has been dropped and both streams are
/// drained.
pub fn spawn_trace_logger(streams: TraceStreams) -> JoinHandle<()> {
    tokio::spawn(drain_traces(streams, |record| log_record(&record)))
}

/// Feeds every record from both streams to `sink` until both are closed.
///
/// The request stream is polled first, so a round trip's request record is
/// always handed over before its response record.
pub async fn drain_traces<F>(streams: TraceStreams, mut sink: F)
where
    F: FnMut(TraceRecord),
{
    let TraceStreams {
        mut requests,
        mut responses,
    } = streams;

    loop {
        tokio::select! {
            biased;
            Some(record) = requests.recv() => sink(record),
            Some(record) = responses.recv() => sink(record),
            else => break,
        }
    }

    let dropped = requests.dropped() + responses.dropped();
    if dropped > 0 {
        warn!(dropped, "trace records were dropped because the queue was full");
    }
}

fn log_record(record: &TraceRecord) {
    info!(
        target: "oceanctl::trace",
        trace_id = %record.id,
        direction = %record.direction,
        "{}",
        record.render()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::TraceConfig;
    use crate::record::{Direction, TraceId};
    use crate::tracer::Tracer;
    use crate::transport::{HttpRequest, HttpResponse, Transport};
    use crate::TransportError;

    use bytes::Bytes;

    struct Ok200;

    impl Transport for Ok200 {
        async fn round_trip(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(Bytes::from_static(b"{}")))
        }
    }

    fn get() -> HttpRequest {
        http::Request::get("https://api.example.com/v2/account")
            .body(Bytes::new())
            .expect("request")
    }

    #[tokio::test]
    async fn drain_ends_when_tracer_is_dropped() {
        let (tracer, streams) = Tracer::new(Ok200, &TraceConfig::default());
        tracer.round_trip(get()).await.expect("round trip");
        drop(tracer);

        let mut seen = Vec::new();
        drain_traces(streams, |record| seen.push((record.id, record.direction))).await;

        assert_eq!(
            seen,
            vec![
                (TraceId(1), Direction::Request),
                (TraceId(1), Direction::Response)
            ]
        );
    }

    #[tokio::test]
    async fn spawned_logger_drains_live_traffic() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let (tracer, streams) = Tracer::new(Ok200, &TraceConfig::default());
        let logger = spawn_trace_logger(streams);

        for _ in 0..3 {
            tracer.round_trip(get()).await.expect("round trip");
        }
        drop(tracer);

        logger.await.expect("logger task");
    }
}
