use log::warn;

/// Tracks which sample/comparison/tab is active. The only mutable state in
/// the core: single writer, and every index change notifies the listener
/// exactly once so dependent charts rebuild without duplicates.
#[derive(Default)]
pub struct PagedSelector {
    keys: Vec<String>,
    active: usize,
    listener: Option<Box<dyn FnMut(usize)>>,
}

impl PagedSelector {
    pub fn new() -> PagedSelector {
        PagedSelector::default()
    }

    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(usize) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_key(&self) -> Option<&str> {
        self.keys.get(self.active).map(String::as_str)
    }

    /// Installs a new ordered key list. The active index always resets to 0;
    /// callers that depended on the previous position must re-derive it. The
    /// listener fires only if the index actually moved.
    pub fn set_keys(&mut self, keys: Vec<String>) {
        self.keys = keys;
        if self.active != 0 {
            self.active = 0;
            self.notify();
        }
    }

    /// Selects a key by index. Re-selecting the current index is a no-op;
    /// an out-of-range index is logged and ignored rather than panicking.
    pub fn set_active(&mut self, index: usize) {
        if index == self.active {
            return;
        }
        if index >= self.keys.len() {
            warn!(
                "active index {index} out of range for {} keys, ignored",
                self.keys.len()
            );
            return;
        }
        self.active = index;
        self.notify();
    }

    /// Fires the listener for the current index. Used once after page setup,
    /// mirroring the initial chart build on mount.
    pub fn prime(&mut self) {
        self.notify();
    }

    fn notify(&mut self) {
        let index = self.active;
        if let Some(listener) = self.listener.as_mut() {
            listener(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counting_selector() -> (PagedSelector, Rc<RefCell<Vec<usize>>>) {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut selector = PagedSelector::new();
        let sink = Rc::clone(&fired);
        selector.on_change(move |i| sink.borrow_mut().push(i));
        (selector, fired)
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn change_notifies_exactly_once() {
        let (mut selector, fired) = counting_selector();
        selector.set_keys(keys(&["a", "b", "c"]));
        selector.set_active(2);
        assert_eq!(*fired.borrow(), vec![2]);
    }

    #[test]
    fn same_index_does_not_notify() {
        let (mut selector, fired) = counting_selector();
        selector.set_keys(keys(&["a", "b"]));
        selector.set_active(0);
        selector.set_active(1);
        selector.set_active(1);
        assert_eq!(*fired.borrow(), vec![1]);
    }

    #[test]
    fn new_key_list_resets_to_zero() {
        let (mut selector, fired) = counting_selector();
        selector.set_keys(keys(&["a", "b", "c"]));
        selector.set_active(2);
        selector.set_keys(keys(&["x", "y"]));
        assert_eq!(selector.active_index(), 0);
        assert_eq!(selector.active_key(), Some("x"));
        // one rebuild for the selection, one for the reset
        assert_eq!(*fired.borrow(), vec![2, 0]);
    }

    #[test]
    fn new_key_list_at_zero_stays_quiet() {
        let (mut selector, fired) = counting_selector();
        selector.set_keys(keys(&["a", "b"]));
        selector.set_keys(keys(&["c", "d"]));
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let (mut selector, fired) = counting_selector();
        selector.set_keys(keys(&["a"]));
        selector.set_active(5);
        assert_eq!(selector.active_index(), 0);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn prime_fires_for_current_index() {
        let (mut selector, fired) = counting_selector();
        selector.set_keys(keys(&["a", "b"]));
        selector.prime();
        assert_eq!(*fired.borrow(), vec![0]);
    }
}
