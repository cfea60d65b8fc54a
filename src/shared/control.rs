use core::ptr::NonNull;

use crate::error::SharedError;
use crate::ref_count::RefCount;
use crate::unique::{self, Unique};

//Invariant C: a control block is freed by the release that takes its count to 0 and by nothing else.
//The value it holds is alive for exactly as long as the block is.

//Theorem D: the value is destroyed as the type it was allocated with.
// 1. `dispose` is instantiated for V when the block is created and never changes.
// 2. Handles only store views of the value and never free through them.

#[repr(C)]
pub(crate) struct Control {
    count : RefCount,
    dispose : unsafe fn(NonNull<Control>),
}

#[repr(C)]
struct ControlBlock<V : ?Sized> {
    header : Control,
    _value : Unique<V>,
}

unsafe fn dispose<V : ?Sized>(control : NonNull<Control>)
{
    // (D) header is the first field of a repr(C) ControlBlock<V>
    drop(Unique::from_non_null(control.cast::<ControlBlock<V>>()));
}

impl <V : ?Sized> ControlBlock<V> {
    fn new(value : Unique<V>) -> ControlBlock<V>
    {
        ControlBlock {
            header : Control { count : RefCount::new(), dispose : dispose::<V> },
            _value : value
        }
    }
}

impl Control {
    pub(crate) fn create<V : ?Sized>(value : Unique<V>) -> NonNull<Control>
    {
        let block = NonNull::from(Box::leak(Box::new(ControlBlock::new(value))));
        log::trace!("allocated control block {:p}", block);
        block.cast()
    }

    // On failure `value` is dropped before returning, so neither allocation outlives the error.
    pub(crate) fn try_create<V : ?Sized>(value : Unique<V>) -> Result<NonNull<Control>, SharedError>
    {
        let block = unique::try_allocate(ControlBlock::new(value))?;
        log::trace!("allocated control block {:p}", block);
        Ok(block.cast())
    }

    // `this` must be live (C) for all of the following.

    pub(crate) unsafe fn acquire(this : NonNull<Control>)
    {
        this.as_ref().count.increment();
    }

    pub(crate) unsafe fn release(this : NonNull<Control>) -> isize
    {
        let remaining = this.as_ref().count.decrement();
        if remaining == 0 {
            log::trace!("last owner gone, disposing control block {:p}", this);
            let dispose = this.as_ref().dispose;
            dispose(this);
        }
        remaining
    }

    pub(crate) unsafe fn count(this : NonNull<Control>) -> isize
    {
        this.as_ref().count.value()
    }
}
