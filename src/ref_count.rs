use core::cell::Cell;

/// Number of owners currently sharing one value. Starts at 1 and is never touched again once it reaches 0.
#[derive(Debug)]
pub struct RefCount {
    count : Cell<isize>
}

impl RefCount {
    pub fn new() -> RefCount
    {
        RefCount { count : Cell::new(1) }
    }

    pub fn increment(&self)
    {
        let count = self.count.get();
        // an overflowing counter would free the value while owners remain
        if count == isize::MAX {
            std::process::abort();
        }
        self.count.set(count + 1);
    }

    /// Decrements the counter and returns the new count. The caller owning the last reference must release
    /// the value once this returns 0.
    pub fn decrement(&self) -> isize
    {
        let count = self.count.get();
        debug_assert!(count > 0, "decrement of a collected RefCount");
        self.count.set(count - 1);
        count - 1
    }

    pub fn value(&self) -> isize
    {
        self.count.get()
    }
}

impl Default for RefCount {
    fn default() -> Self
    {
        RefCount::new()
    }
}
