//! In-process pub-sub channel for engine events.
//!
//! An [`EventHandler`] owns the receiving end of a bounded channel and runs one async handler per event. Any number of
//! [`EventProducer`]s can publish to it. The handler stops once every producer has been dropped and all in-flight
//! jobs have finished.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use thiserror::Error;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinSet},
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[derive(Debug, Clone, Error)]
pub enum EventError {
    #[error("The event handler has shut down")]
    ChannelClosed,
}

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for the outstanding jobs to finish.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // The channel only closes once this sender is gone too
        drop(self.sender);
        let mut jobs = JoinSet::new();
        loop {
            tokio::select! {
                Some(result) = jobs.join_next(), if !jobs.is_empty() => log_job_result(result),
                event = self.listener.recv() => match event {
                    Some(event) => {
                        trace!("📬️ Handling event");
                        let handler = Arc::clone(&self.handler);
                        jobs.spawn(async move { (handler)(event).await });
                    },
                    None => break,
                },
            }
        }
        if !jobs.is_empty() {
            debug!("📬️ Waiting for {} jobs to complete", jobs.len());
        }
        while let Some(result) = jobs.join_next().await {
            log_job_result(result);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_job_result(result: Result<(), JoinError>) {
    match result {
        Ok(()) => trace!("📬️ Event handled"),
        Err(e) => warn!("📬️ An event handler job did not complete. {e}"),
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) -> Result<(), EventError> {
        self.sender.send(event).await.map_err(|e| {
            error!("📬️ Failed to send event: {e}");
            EventError::ChannelClosed
        })
    }
}
