// 5.0.2: metadata selection rules, kept apart from the folds that use them.
// FirstSeen: set once, never replaced. SmallestKey: replaced only by a strictly smaller key.

#[derive(Debug, Clone, PartialEq)]
pub struct FirstSeen<T>(Option<T>);

impl<T> Default for FirstSeen<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> FirstSeen<T> {
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    // returns true when this call did the setting
    pub fn offer_with(&mut self, make: impl FnOnce() -> T) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(make());
        true
    }

    // merge: keep ours if set, otherwise adopt theirs
    pub fn merge(&mut self, other: FirstSeen<T>) {
        if self.0.is_none() {
            self.0 = other.0;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmallestKey<K, T>(Option<(K, T)>);

impl<K, T> Default for SmallestKey<K, T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<K: Ord, T> SmallestKey<K, T> {
    pub fn key(&self) -> Option<&K> {
        self.0.as_ref().map(|(k, _)| k)
    }

    pub fn get(&self) -> Option<(&K, &T)> {
        self.0.as_ref().map(|(k, v)| (k, v))
    }

    pub fn would_replace(&self, key: &K) -> bool {
        match &self.0 {
            None => true,
            Some((current, _)) => key < current,
        }
    }

    // value is only built when it wins
    pub fn offer_with(&mut self, key: &K, make: impl FnOnce() -> (K, T)) -> bool {
        if !self.would_replace(key) {
            return false;
        }
        self.0 = Some(make());
        true
    }

    // equal keys keep ours
    pub fn merge(&mut self, other: SmallestKey<K, T>) {
        if let Some((key, value)) = other.0 {
            if self.would_replace(&key) {
                self.0 = Some((key, value));
            }
        }
    }
}
