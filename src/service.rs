use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use tower::Service;

use crate::controller::RequestSink;
use crate::request::Request;

/// Tower front-end for request submission, so drivers can stack middleware
/// (validation filters, rate limits) on top of any [`RequestSink`].
pub struct DispatchService<S> {
    sink: Arc<S>,
}

impl<S> DispatchService<S> {
    pub fn new(sink: Arc<S>) -> Self {
        DispatchService { sink }
    }
}

impl<S> Clone for DispatchService<S> {
    fn clone(&self) -> Self {
        DispatchService {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> Service<Request> for DispatchService<S>
where
    S: RequestSink + 'static,
{
    type Response = ();
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let sink = Arc::clone(&self.sink);
        Box::pin(async move { sink.submit(request).await })
    }
}
