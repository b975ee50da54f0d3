//! Sensor registry and output queues
//!
//! Drivers publish samples into fixed-depth queues and register those queues
//! here, keyed by sensor kind, so attitude estimation can find them without
//! knowing which chip produced the data.
//!
//! ## Queue semantics
//!
//! - Capacity is [`SENSOR_QUEUE_DEPTH`]
//! - The producer side never blocks; a full queue drops the new sample and
//!   the producer is told so
//! - Consumers either poll with [`SensorQueue::try_receive`] or park on
//!   [`SensorQueue::receive`]

use crate::core::traits::{CsState, SharedState};
use crate::devices::traits::{AccelSample, GyroSample};
use core::fmt;
use core::ptr;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::FnvIndexMap;

/// Depth of every sensor output queue
pub const SENSOR_QUEUE_DEPTH: usize = 2;

/// Maximum number of registered sensor kinds (power of two for the index map)
const MAX_SENSORS: usize = 4;

/// Outcome of a non-blocking enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Enqueued {
    /// Sample stored
    ///
    /// `woken` is set when the sample landed in an empty queue. The channel
    /// does not say whether a consumer is actually parked, so this can ask
    /// for a reschedule nobody needed; it never misses one.
    Accepted { woken: bool },
    /// Queue full, sample discarded
    Dropped,
}

impl Enqueued {
    /// Whether the enqueue warrants a reschedule
    pub fn woken(self) -> bool {
        matches!(self, Enqueued::Accepted { woken: true })
    }
}

/// Bounded sample queue safe to feed from an interrupt handler
pub struct SensorQueue<T> {
    channel: Channel<CriticalSectionRawMutex, T, SENSOR_QUEUE_DEPTH>,
}

impl<T> SensorQueue<T> {
    /// Create an empty queue
    ///
    /// This is a const fn so queues can live in statics.
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without blocking
    pub fn send_from_isr(&self, sample: T) -> Enqueued {
        let was_empty = self.channel.is_empty();
        match self.channel.try_send(sample) {
            Ok(()) => Enqueued::Accepted { woken: was_empty },
            Err(_) => Enqueued::Dropped,
        }
    }

    /// Dequeue the oldest sample if one is present
    pub fn try_receive(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next sample
    pub async fn receive(&self) -> T {
        self.channel.receive().await
    }

    /// Number of queued samples
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<T> Default for SensorQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of sensor a queue carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    /// Accelerometer
    Accel,
    /// Gyroscope
    Gyro,
}

/// Typed reference to a registered queue
#[derive(Clone, Copy)]
pub enum QueueHandle<'a> {
    /// Gyro sample queue
    Gyro(&'a SensorQueue<GyroSample>),
    /// Accel sample queue
    Accel(&'a SensorQueue<AccelSample>),
}

impl QueueHandle<'_> {
    /// Sensor kind carried by this queue
    pub fn kind(&self) -> SensorKind {
        match self {
            QueueHandle::Gyro(_) => SensorKind::Gyro,
            QueueHandle::Accel(_) => SensorKind::Accel,
        }
    }

    /// Whether both handles refer to the same queue
    pub fn same_queue(&self, other: &QueueHandle<'_>) -> bool {
        match (self, other) {
            (QueueHandle::Gyro(a), QueueHandle::Gyro(b)) => ptr::eq(*a, *b),
            (QueueHandle::Accel(a), QueueHandle::Accel(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }
}

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// A queue is already registered for this kind
    AlreadyRegistered(SensorKind),
    /// Handle type does not match the requested kind
    KindMismatch,
    /// No free slots
    Full,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyRegistered(kind) => {
                write!(f, "{:?} queue already registered", kind)
            }
            RegistryError::KindMismatch => write!(f, "Queue type does not match sensor kind"),
            RegistryError::Full => write!(f, "Sensor registry full"),
        }
    }
}

struct RegistryTable<'a> {
    queues: FnvIndexMap<SensorKind, QueueHandle<'a>, MAX_SENSORS>,
    max_gyro_dps: u16,
}

/// Board-wide sensor registry
///
/// Shared between the driver (task context) and consumers; every access goes
/// through a critical section.
pub struct SensorRegistry<'a> {
    table: CsState<RegistryTable<'a>>,
}

impl<'a> SensorRegistry<'a> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            table: CsState::new(RegistryTable {
                queues: FnvIndexMap::new(),
                max_gyro_dps: 0,
            }),
        }
    }

    /// Register the output queue for `kind`
    ///
    /// # Errors
    ///
    /// - `KindMismatch` if `handle` carries a different sample type
    /// - `AlreadyRegistered` if `kind` already has a different queue
    ///
    /// Registering the queue that is already in place is a no-op.
    /// - `Full` if no slot is left
    pub fn register(&self, kind: SensorKind, handle: QueueHandle<'a>) -> Result<(), RegistryError> {
        if handle.kind() != kind {
            return Err(RegistryError::KindMismatch);
        }
        self.table.with_mut(|table| {
            if let Some(existing) = table.queues.get(&kind) {
                if existing.same_queue(&handle) {
                    return Ok(());
                }
                return Err(RegistryError::AlreadyRegistered(kind));
            }
            table
                .queues
                .insert(kind, handle)
                .map(|_| ())
                .map_err(|_| RegistryError::Full)
        })
    }

    /// Drop the queue registered for `kind`; `true` if there was one
    pub fn unregister(&self, kind: SensorKind) -> bool {
        self.table
            .with_mut(|table| table.queues.remove(&kind).is_some())
    }

    /// Whether a queue is registered for `kind`
    pub fn is_registered(&self, kind: SensorKind) -> bool {
        self.table.with(|table| table.queues.contains_key(&kind))
    }

    /// Registered gyro queue
    pub fn gyro_queue(&self) -> Option<&'a SensorQueue<GyroSample>> {
        self.table
            .with(|table| match table.queues.get(&SensorKind::Gyro) {
                Some(QueueHandle::Gyro(queue)) => Some(*queue),
                _ => None,
            })
    }

    /// Registered accel queue
    pub fn accel_queue(&self) -> Option<&'a SensorQueue<AccelSample>> {
        self.table
            .with(|table| match table.queues.get(&SensorKind::Accel) {
                Some(QueueHandle::Accel(queue)) => Some(*queue),
                _ => None,
            })
    }

    /// Publish the gyro full-scale rate in deg/s
    pub fn set_max_gyro(&self, dps: u16) {
        self.table.with_mut(|table| table.max_gyro_dps = dps);
    }

    /// Gyro full-scale rate in deg/s (0 until a gyro range is set)
    pub fn max_gyro(&self) -> u16 {
        self.table.with(|table| table.max_gyro_dps)
    }
}

impl Default for SensorRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drops_when_full() {
        let queue = SensorQueue::<u8>::new();
        assert_eq!(queue.send_from_isr(1), Enqueued::Accepted { woken: true });
        assert_eq!(queue.send_from_isr(2), Enqueued::Accepted { woken: false });
        assert_eq!(queue.send_from_isr(3), Enqueued::Dropped);
        assert_eq!(queue.len(), SENSOR_QUEUE_DEPTH);

        assert_eq!(queue.try_receive(), Some(1));
        assert_eq!(queue.try_receive(), Some(2));
        assert_eq!(queue.try_receive(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_async_receive() {
        let queue = SensorQueue::<u8>::new();
        queue.send_from_isr(42);
        let value = embassy_futures::block_on(queue.receive());
        assert_eq!(value, 42);
    }

    #[test]
    fn test_enqueued_woken() {
        assert!(Enqueued::Accepted { woken: true }.woken());
        assert!(!Enqueued::Accepted { woken: false }.woken());
        assert!(!Enqueued::Dropped.woken());
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let gyro = SensorQueue::<GyroSample>::new();
        let accel = SensorQueue::<AccelSample>::new();
        let registry = SensorRegistry::new();

        registry
            .register(SensorKind::Gyro, QueueHandle::Gyro(&gyro))
            .unwrap();
        assert!(registry.is_registered(SensorKind::Gyro));
        assert!(!registry.is_registered(SensorKind::Accel));
        assert!(registry.accel_queue().is_none());

        registry
            .register(SensorKind::Accel, QueueHandle::Accel(&accel))
            .unwrap();

        gyro.send_from_isr(GyroSample::default());
        let found = registry.gyro_queue().unwrap();
        assert_eq!(found.len(), 1);
        assert!(core::ptr::eq(registry.accel_queue().unwrap(), &accel));
    }

    #[test]
    fn test_registry_rejects_duplicate_and_mismatch() {
        let gyro = SensorQueue::<GyroSample>::new();
        let other = SensorQueue::<GyroSample>::new();
        let registry = SensorRegistry::new();

        assert_eq!(
            registry.register(SensorKind::Accel, QueueHandle::Gyro(&gyro)),
            Err(RegistryError::KindMismatch)
        );
        registry
            .register(SensorKind::Gyro, QueueHandle::Gyro(&gyro))
            .unwrap();
        assert_eq!(
            registry.register(SensorKind::Gyro, QueueHandle::Gyro(&other)),
            Err(RegistryError::AlreadyRegistered(SensorKind::Gyro))
        );
        assert!(core::ptr::eq(registry.gyro_queue().unwrap(), &gyro));
    }

    #[test]
    fn test_registry_same_queue_is_idempotent() {
        let gyro = SensorQueue::<GyroSample>::new();
        let registry = SensorRegistry::new();

        registry
            .register(SensorKind::Gyro, QueueHandle::Gyro(&gyro))
            .unwrap();
        assert_eq!(
            registry.register(SensorKind::Gyro, QueueHandle::Gyro(&gyro)),
            Ok(())
        );
    }

    #[test]
    fn test_registry_unregister() {
        let accel = SensorQueue::<AccelSample>::new();
        let registry = SensorRegistry::new();

        assert!(!registry.unregister(SensorKind::Accel));
        registry
            .register(SensorKind::Accel, QueueHandle::Accel(&accel))
            .unwrap();
        assert!(registry.unregister(SensorKind::Accel));
        assert!(!registry.is_registered(SensorKind::Accel));
    }

    #[test]
    fn test_registry_max_gyro() {
        let registry = SensorRegistry::new();
        assert_eq!(registry.max_gyro(), 0);
        registry.set_max_gyro(500);
        assert_eq!(registry.max_gyro(), 500);
    }
}
