use std::collections::HashMap;

use caesura_state::AdInfo;

/// Opaque media handle issued by the ad SDK for one loaded ad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdHandle(pub u64);

/// Bidirectional `AdHandle ↔ AdInfo` map: two plain maps kept in sync.
///
/// `force_put` re-binds an existing handle (or an existing target) instead of
/// failing — the SDK may re-announce the same handle with a revised URI, or
/// re-issue a fresh handle for an ad it already announced.
#[derive(Debug, Default)]
pub struct HandleMap {
    by_handle: HashMap<AdHandle, AdInfo>,
    by_info: HashMap<AdInfo, AdHandle>,
}

impl HandleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force_put(&mut self, handle: AdHandle, info: AdInfo) {
        if let Some(old_info) = self.by_handle.insert(handle, info) {
            self.by_info.remove(&old_info);
        }
        if let Some(old_handle) = self.by_info.insert(info, handle) {
            if old_handle != handle {
                self.by_handle.remove(&old_handle);
            }
        }
    }

    pub fn info_for(&self, handle: AdHandle) -> Option<AdInfo> {
        self.by_handle.get(&handle).copied()
    }

    pub fn handle_for(&self, info: AdInfo) -> Option<AdHandle> {
        self.by_info.get(&info).copied()
    }

    pub fn clear(&mut self) {
        self.by_handle.clear();
        self.by_info.clear();
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_both_directions() {
        let mut map = HandleMap::new();
        let info = AdInfo::new(1, 2);
        map.force_put(AdHandle(7), info);
        assert_eq!(map.info_for(AdHandle(7)), Some(info));
        assert_eq!(map.handle_for(info), Some(AdHandle(7)));
    }

    #[test]
    fn force_put_rebinds_same_handle() {
        let mut map = HandleMap::new();
        map.force_put(AdHandle(7), AdInfo::new(0, 0));
        map.force_put(AdHandle(7), AdInfo::new(0, 1));

        assert_eq!(map.info_for(AdHandle(7)), Some(AdInfo::new(0, 1)));
        // The abandoned target no longer resolves.
        assert_eq!(map.handle_for(AdInfo::new(0, 0)), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn force_put_rebinds_same_target() {
        let mut map = HandleMap::new();
        let info = AdInfo::new(2, 0);
        map.force_put(AdHandle(1), info);
        map.force_put(AdHandle(2), info);

        assert_eq!(map.handle_for(info), Some(AdHandle(2)));
        assert_eq!(map.info_for(AdHandle(1)), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn maps_stay_in_sync_under_churn() {
        let mut map = HandleMap::new();
        for i in 0..8u64 {
            map.force_put(AdHandle(i), AdInfo::new(0, (i % 3) as usize));
        }
        // Three distinct targets survive, each with exactly one handle.
        assert_eq!(map.len(), 3);
        for ad in 0..3usize {
            let info = AdInfo::new(0, ad);
            let handle = map.handle_for(info).unwrap();
            assert_eq!(map.info_for(handle), Some(info));
        }
    }
}
