use crate::DeviceId;

/// Ordered, duplicate-free list of the devices found by the last enumeration.
///
/// Holds at most `N` ROM codes, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistry<const N: usize> {
    devices: [DeviceId; N],
    count: usize,
}

impl<const N: usize> Default for DeviceRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DeviceRegistry<N> {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            devices: [DeviceId::new([0; 8]); N],
            count: 0,
        }
    }

    /// Maximum number of devices the registry can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of devices.
    pub fn count(&self) -> usize {
        self.count
    }

    /// `true` when no device is registered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` when no more devices fit.
    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// All devices, in discovery order.
    pub fn all(&self) -> &[DeviceId] {
        &self.devices[..self.count]
    }

    /// Device at `index`, or [`None`] past the end.
    pub fn at(&self, index: usize) -> Option<DeviceId> {
        self.all().get(index).copied()
    }

    /// `true` if `rom` is registered.
    pub fn contains(&self, rom: &DeviceId) -> bool {
        self.all().contains(rom)
    }

    /// Iterates over the devices in discovery order.
    pub fn iter(&self) -> core::slice::Iter<'_, DeviceId> {
        self.all().iter()
    }

    /// Appends `rom` unless it is already present.
    ///
    /// Returns `false` if the registry is full and `rom` was dropped.
    pub(crate) fn insert(&mut self, rom: DeviceId) -> bool {
        if self.contains(&rom) {
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.devices[self.count] = rom;
        self.count += 1;
        true
    }
}

impl<'a, const N: usize> IntoIterator for &'a DeviceRegistry<N> {
    type Item = &'a DeviceId;
    type IntoIter = core::slice::Iter<'a, DeviceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_without_duplicates() {
        let a = DeviceId::from(0x11u64);
        let b = DeviceId::from(0x22u64);
        let mut registry = DeviceRegistry::<4>::new();
        assert!(registry.insert(b));
        assert!(registry.insert(a));
        assert!(registry.insert(b));
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.all(), &[b, a]);
        assert_eq!(registry.at(1), Some(a));
        assert_eq!(registry.at(2), None);
    }

    #[test]
    fn refuses_past_capacity() {
        let mut registry = DeviceRegistry::<2>::new();
        assert!(registry.insert(DeviceId::from(1u64)));
        assert!(registry.insert(DeviceId::from(2u64)));
        assert!(registry.is_full());
        assert!(!registry.insert(DeviceId::from(3u64)));
        assert_eq!(registry.count(), registry.capacity());
    }
}
