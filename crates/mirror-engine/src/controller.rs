use crate::config::ControllerConfig;
use mirror_core::{
    AverageBandMatcher, CycleFault, DetectionCycleResult, EmotionClassifier, EmotionState,
    FallbackPolicy, MatchingStrategy, PersonState, RecognitionBackend,
    ThresholdEmotionClassifier, VideoSource,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq)]
pub enum ControllerError {
    #[error("controller started before initialize() completed")]
    NotInitialized,
    #[error("video source is not available")]
    NoVideoSource,
    #[error("detection loop task failed: {0}")]
    LoopFailed(String),
}

/// Outcome of [`DetectionController::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Backend loaded; cycles consult it.
    Ready,
    /// Backend failed to load; every cycle uses the fallback policy.
    Degraded,
}

type UpdateFn = Box<dyn FnMut(DetectionCycleResult) + Send>;

struct Sink {
    cancelled: bool,
    on_update: UpdateFn,
}

/// Delivery point shared by the loop task and manual overrides.
///
/// Holding the lock while delivering means `cancel()` cannot return while a
/// delivery is running, and no delivery starts after it.
struct Publisher {
    sink: Mutex<Sink>,
    current: watch::Sender<DetectionCycleResult>,
}

impl Publisher {
    fn new(on_update: UpdateFn) -> Self {
        let (current, _) = watch::channel(DetectionCycleResult::awakening());
        Self {
            sink: Mutex::new(Sink {
                cancelled: false,
                on_update,
            }),
            current,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deliver `result` unless cancelled. Returns whether it was delivered.
    fn publish(&self, result: DetectionCycleResult) -> bool {
        let mut sink = self.lock();
        if sink.cancelled {
            return false;
        }
        self.current.send_replace(result.clone());
        (sink.on_update)(result);
        true
    }

    /// Returns true only for the call that performed the cancellation.
    fn cancel(&self) -> bool {
        let mut sink = self.lock();
        !std::mem::replace(&mut sink.cancelled, true)
    }

    fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }
}

/// Turns video frames into a continuously updated (person, emotion) pair.
///
/// Backend, matcher and classifier failures never escape: they become
/// fallback verdicts carrying a [`CycleFault`].
pub struct DetectionController<B> {
    backend: B,
    matcher: Box<dyn MatchingStrategy>,
    classifier: Box<dyn EmotionClassifier>,
    fallback: FallbackPolicy,
    cycle_interval: Duration,
    readiness: OnceCell<Readiness>,
    /// Serializes backend calls across every loop started from this controller.
    backend_gate: tokio::sync::Mutex<()>,
}

impl<B: RecognitionBackend> DetectionController<B> {
    /// Controller with the placeholder matcher, 0.6 emotion threshold and a
    /// 30% primary fallback.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            matcher: Box::new(AverageBandMatcher::default()),
            classifier: Box::new(ThresholdEmotionClassifier::default()),
            fallback: FallbackPolicy::default(),
            cycle_interval: ControllerConfig::default().cycle_interval(),
            readiness: OnceCell::new(),
            backend_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn from_config(backend: B, config: &ControllerConfig) -> Self {
        Self::new(backend)
            .with_matcher(AverageBandMatcher::new(
                config.match_band_low,
                config.match_band_high,
            ))
            .with_classifier(ThresholdEmotionClassifier::new(config.emotion_threshold))
            .with_fallback(FallbackPolicy::new(
                config.fallback_primary_probability,
                config.fallback_seed,
            ))
            .with_cycle_interval(config.cycle_interval())
    }

    pub fn with_matcher(mut self, matcher: impl MatchingStrategy + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_classifier(mut self, classifier: impl EmotionClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_cycle_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = interval;
        self
    }

    /// `None` until [`initialize`](Self::initialize) completes.
    pub fn readiness(&self) -> Option<Readiness> {
        self.readiness.get().copied()
    }

    /// Load the backend. A load failure is logged and yields
    /// [`Readiness::Degraded`] instead of an error. Later calls return the
    /// first outcome without reloading.
    pub async fn initialize(&self) -> Readiness {
        *self
            .readiness
            .get_or_init(|| async {
                match self.backend.load().await {
                    Ok(()) => {
                        tracing::info!("recognition backend ready");
                        Readiness::Ready
                    }
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "recognition backend unavailable; using fallback detection"
                        );
                        Readiness::Degraded
                    }
                }
            })
            .await
    }

    /// Run a single detection cycle against the current frame of `video`.
    pub async fn run_one_cycle<V: VideoSource + ?Sized>(&self, video: &V) -> DetectionCycleResult {
        let Some(readiness) = self.readiness() else {
            return DetectionCycleResult::awakening();
        };
        if readiness == Readiness::Degraded {
            return self.fallback_result(CycleFault::Degraded);
        }

        let Some(frame) = video.current_frame() else {
            tracing::trace!("no frame available yet");
            return DetectionCycleResult::no_face();
        };

        let detected = {
            let _gate = self.backend_gate.lock().await;
            self.backend.detect_faces(&frame).await
        };
        let faces = match detected {
            Ok(faces) => faces,
            Err(err) => {
                tracing::warn!(error = %err, frame = frame.sequence, "face detection failed");
                return self.fallback_result(CycleFault::Backend(err.to_string()));
            }
        };

        let Some(face) = faces.first() else {
            return DetectionCycleResult::no_face();
        };

        let mut fault = None;
        let person = match self.matcher.identify(&face.descriptor) {
            Ok(identity) => PersonState::from(identity),
            Err(err) => {
                tracing::debug!(error = %err, "matching failed; using fallback verdict");
                fault = Some(CycleFault::Match(err.to_string()));
                self.fallback.person()
            }
        };
        let emotion = match self.classifier.classify(face.expressions.as_ref()) {
            Ok(emotion) => emotion,
            Err(err) => {
                tracing::debug!(error = %err, "emotion classification failed; using fallback");
                fault.get_or_insert(CycleFault::Emotion(err.to_string()));
                self.fallback.emotion()
            }
        };

        tracing::trace!(%person, %emotion, faces = faces.len(), frame = frame.sequence, "cycle complete");
        DetectionCycleResult {
            person,
            emotion,
            fault,
        }
    }

    fn fallback_result(&self, fault: CycleFault) -> DetectionCycleResult {
        DetectionCycleResult::new(self.fallback.person(), self.fallback.emotion()).with_fault(fault)
    }

    /// Spawn the detection loop on the current tokio runtime.
    ///
    /// Cycles run back to back, one at a time, pausing for the configured
    /// interval between them. Each result goes to `on_update` (and the
    /// handle's watch channel) before the next cycle starts. `on_update`
    /// must not call back into the returned handle.
    pub fn start<V, F>(
        self: &Arc<Self>,
        video: V,
        on_update: F,
    ) -> Result<LoopHandle, ControllerError>
    where
        V: VideoSource,
        F: FnMut(DetectionCycleResult) + Send + 'static,
    {
        if self.readiness().is_none() {
            return Err(ControllerError::NotInitialized);
        }
        if !video.is_available() {
            return Err(ControllerError::NoVideoSource);
        }

        let session = Uuid::new_v4();
        let publisher = Arc::new(Publisher::new(Box::new(on_update)));
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn(run_loop(
            Arc::clone(self),
            video,
            Arc::clone(&publisher),
            stop_rx,
            session,
        ));

        Ok(LoopHandle {
            session,
            publisher,
            stop_tx,
            task: Some(task),
        })
    }
}

async fn run_loop<B: RecognitionBackend, V: VideoSource>(
    controller: Arc<DetectionController<B>>,
    video: V,
    publisher: Arc<Publisher>,
    mut stop_rx: watch::Receiver<bool>,
    session: Uuid,
) {
    let interval = controller.cycle_interval;
    tracing::info!(%session, interval_ms = interval.as_millis() as u64, "detection loop started");

    let mut cycles: u64 = 0;
    while !*stop_rx.borrow() {
        let result = controller.run_one_cycle(&video).await;
        if !publisher.publish(result) {
            tracing::debug!(%session, "loop cancelled mid-cycle; result discarded");
            break;
        }
        cycles += 1;

        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = stop_rx.changed() => {}
            }
        }
    }

    tracing::info!(%session, cycles, "detection loop stopped");
}

/// Control handle for a running detection loop.
///
/// Dropping the handle cancels the loop.
pub struct LoopHandle {
    session: Uuid,
    publisher: Arc<Publisher>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl LoopHandle {
    pub fn session_id(&self) -> Uuid {
        self.session
    }

    /// Stop scheduling cycles. An in-flight cycle finishes but its result is
    /// discarded. Safe to call any number of times.
    pub fn cancel(&self) {
        if self.publisher.cancel() {
            tracing::info!(session = %self.session, "detection loop cancelled");
        }
        self.stop_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.publisher.is_cancelled()
    }

    /// Publish `(person, emotion)` immediately, bypassing the backend. The
    /// loop keeps running and its next cycle overwrites this state.
    /// Returns false once the loop has been cancelled.
    pub fn override_state(&self, person: PersonState, emotion: EmotionState) -> bool {
        let delivered = self
            .publisher
            .publish(DetectionCycleResult::new(person, emotion));
        if delivered {
            tracing::info!(session = %self.session, %person, %emotion, "manual override published");
        }
        delivered
    }

    /// The most recently published result.
    pub fn current(&self) -> DetectionCycleResult {
        self.publisher.current.borrow().clone()
    }

    /// Watch channel always holding the most recently published result.
    pub fn subscribe(&self) -> watch::Receiver<DetectionCycleResult> {
        self.publisher.current.subscribe()
    }

    /// Cancel the loop and wait for its task to exit.
    pub async fn shutdown(mut self) -> Result<(), ControllerError> {
        self.cancel();
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| ControllerError::LoopFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
