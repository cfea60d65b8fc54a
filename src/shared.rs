use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ops::Deref;
use core::ptr::{self, NonNull};

mod control;
pub(crate) use self::control::Control;

use crate::error::SharedError;
use crate::unique::Unique;

//Invariant S: a non-empty handle holds a live control block (C) and counts for exactly one of its references.
//Handles that share a control block are co-owners; the count equals the number of non-empty co-owners.

//Theorem R: an address with Provenance::Owned may be written through when its handle is the only owner.
// 1. Owned addresses derive from the raw allocation or from other Owned addresses by pointer casts.
// 2. References returned by Deref/get borrow the handle, so none outlive a call to get_mut.
// 3. count == 1 means no other handle, and therefore no other reference, exists (S).

/// How a handle obtained its address.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Provenance {
    /// Derived from the allocation by pointer casts, writable when unique (R).
    Owned,
    /// Owned, but viewed through the `ReadOnly` qualifier.
    Frozen,
    /// Produced by a reference conversion. Never writable.
    Borrowed,
}

pub(crate) struct Owner<T : ?Sized> {
    pub(crate) ptr : NonNull<T>,
    pub(crate) control : NonNull<Control>,
    pub(crate) provenance : Provenance,
}

impl <T : ?Sized> Clone for Owner<T> {
    fn clone(&self) -> Self
    {
        *self
    }
}

impl <T : ?Sized> Copy for Owner<T> {}

/// A reference-counted owning handle. Cloning shares ownership, dropping the last owner destroys the value.
///
/// A handle may be empty. Empty handles own nothing and report a `use_count` of 0.
/// The value is always destroyed as the type it was allocated with, so a `Shared<dyn Trait>` built from a
/// `Box<Concrete>` runs `Concrete`'s destructor.
pub struct Shared<T : ?Sized> {
    inner : Option<Owner<T>>,
    _ph : PhantomData<T>
}

impl <T> Shared<T> {
    pub fn new(value : T) -> Shared<T>
    {
        Shared::from_unique(Unique::new(value))
    }

    /// Like `new`, but reports allocation failure. Either both the value and its counter are allocated
    /// or neither is.
    pub fn try_new(value : T) -> Result<Shared<T>, SharedError>
    {
        let value = Unique::try_new(value)?;
        Shared::try_from_unique(value)
    }
}

impl <T : ?Sized> Shared<T> {
    pub const fn empty() -> Shared<T>
    {
        Shared { inner : None, _ph : PhantomData }
    }

    pub fn from_box(value : Box<T>) -> Shared<T>
    {
        Shared::from_unique(Unique::from_box(value))
    }

    pub fn from_unique(value : Unique<T>) -> Shared<T>
    {
        match value.as_ptr() {
            Some(ptr) => {
                let control = Control::create(value);
                Shared::from_owner(Owner { ptr, control, provenance : Provenance::Owned })
            }
            None => Shared::empty(),
        }
    }

    pub fn try_from_unique(value : Unique<T>) -> Result<Shared<T>, SharedError>
    {
        match value.as_ptr() {
            Some(ptr) => {
                let control = Control::try_create(value)?;
                Ok(Shared::from_owner(Owner { ptr, control, provenance : Provenance::Owned }))
            }
            None => Ok(Shared::empty()),
        }
    }

    /// Takes shared ownership of `ptr`. A null pointer gives an empty handle.
    /// # Safety
    /// A non-null `ptr` must come from `Box::into_raw` or `Unique::into_raw` and must not be owned elsewhere.
    pub unsafe fn from_raw(ptr : *mut T) -> Shared<T>
    {
        Shared::from_unique(Unique::from_raw(ptr))
    }

    pub(crate) fn from_owner(owner : Owner<T>) -> Shared<T>
    {
        Shared { inner : Some(owner), _ph : PhantomData }
    }

    pub(crate) fn owner(&self) -> Option<Owner<T>>
    {
        self.inner
    }

    /// Builds a co-owner of `self` that stores `ptr` instead of `self`'s address.
    /// `ptr` must stay valid for as long as the value of `self` is alive.
    pub(crate) fn alias<U : ?Sized>(&self, ptr : NonNull<U>, provenance : Provenance) -> Shared<U>
    {
        match self.inner {
            Some(owner) => {
                // (S)
                unsafe {
                    Control::acquire(owner.control);
                }
                Shared::from_owner(Owner { ptr, control : owner.control, provenance })
            }
            None => Shared::empty(),
        }
    }

    /// Number of co-owners, 0 for an empty handle.
    pub fn use_count(&self) -> isize
    {
        match self.inner {
            // (S)
            Some(owner) => unsafe { Control::count(owner.control) },
            None => 0,
        }
    }

    /// The stored address, without affecting ownership.
    pub fn as_ptr(&self) -> Option<NonNull<T>>
    {
        self.inner.map(|owner| owner.ptr)
    }

    pub fn get(&self) -> Option<&T>
    {
        self.inner.map(|owner| {
            unsafe { &*owner.ptr.as_ptr() }
        })
    }

    /// Mutable access for the sole owner. Returns None while the value is shared or when the address was
    /// produced by a reference conversion.
    pub fn get_mut(&mut self) -> Option<&mut T>
    {
        let owner = self.inner?;
        // (R)
        if owner.provenance == Provenance::Owned && unsafe { Control::count(owner.control) } == 1 {
            Some(unsafe { &mut *owner.ptr.as_ptr() })
        } else {
            None
        }
    }

    pub fn is_some(&self) -> bool
    {
        self.inner.is_some()
    }

    pub fn is_empty(&self) -> bool
    {
        self.inner.is_none()
    }

    /// Moves ownership into a new handle, leaving this one empty. The count does not change.
    pub fn take(&mut self) -> Shared<T>
    {
        Shared { inner : self.inner.take(), _ph : PhantomData }
    }

    pub fn swap(&mut self, other : &mut Shared<T>)
    {
        mem::swap(&mut self.inner, &mut other.inner);
    }

    /// Makes `self` own what `rhs` owns and releases what `self` owned before. Pass `other.clone()` to
    /// copy-assign and `other.take()` to move-assign.
    pub fn assign(&mut self, mut rhs : Shared<T>)
    {
        log::trace!("assigning {:p} over {:p}", rhs, *self);
        self.swap(&mut rhs);
        drop(rhs);
    }

    /// Transfers ownership to a handle viewing part of the value, or the value as another type.
    /// The count does not change.
    ///
    /// `T` must be `'static`: the value is still dropped as `T`, after the view has forgotten every lifetime
    /// `T` borrows from.
    /// ```compile_fail
    /// use shared_owner::Shared;
    ///
    /// struct Holder<'a> { text : &'a String, n : u32 }
    ///
    /// let text = String::from("borrowed");
    /// let holder = Shared::new(Holder { text : &text, n : 1 });
    /// let n = holder.map(|holder| &holder.n);
    /// drop(text);
    /// assert_eq!(*n, 1);
    /// ```
    pub fn map<U : ?Sized, F>(mut self, f : F) -> Shared<U>
    where T : 'static, F : FnOnce(&T) -> &U
    {
        let owner = match self.inner {
            Some(owner) => owner,
            None => return Shared::empty(),
        };
        let ptr = NonNull::from(f(unsafe { &*owner.ptr.as_ptr() }));
        self.inner = None;
        Shared::from_owner(Owner { ptr, control : owner.control, provenance : Provenance::Borrowed })
    }

    /// True if both handles store the same address. Views of different types compare by address only.
    pub fn ptr_eq<U : ?Sized>(this : &Shared<T>, other : &Shared<U>) -> bool
    {
        let this = this.as_ptr().map(|ptr| ptr.cast::<u8>());
        let other = other.as_ptr().map(|ptr| ptr.cast::<u8>());
        this == other
    }

    /// True if both handles are co-owners of the same value.
    pub fn owner_eq<U : ?Sized>(this : &Shared<T>, other : &Shared<U>) -> bool
    {
        match (this.inner, other.inner) {
            (Some(a), Some(b)) => a.control == b.control,
            _ => false,
        }
    }
}

/// Exchanges the state of two handles. Counts do not change.
pub fn swap<T : ?Sized>(lhs : &mut Shared<T>, rhs : &mut Shared<T>)
{
    lhs.swap(rhs);
}

impl <T : ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Shared<T>
    {
        match self.inner {
            Some(owner) => self.alias(owner.ptr, owner.provenance),
            None => Shared::empty(),
        }
    }
}

impl <T : ?Sized> Drop for Shared<T> {
    fn drop(&mut self) {
        if let Some(owner) = self.inner.take() {
            // (S)
            unsafe {
                Control::release(owner.control);
            }
        }
    }
}

impl <T : ?Sized> Deref for Shared<T> {
    type Target = T;
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced an empty Shared"),
        }
    }
}

impl <T : ?Sized> Default for Shared<T> {
    fn default() -> Self
    {
        Shared::empty()
    }
}

impl <T : ?Sized> From<Box<T>> for Shared<T> {
    fn from(value : Box<T>) -> Self
    {
        Shared::from_box(value)
    }
}

impl <T : ?Sized> From<Unique<T>> for Shared<T> {
    fn from(value : Unique<T>) -> Self
    {
        Shared::from_unique(value)
    }
}

impl <T : ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.get() {
            Some(value) => f.debug_tuple("Shared").field(&value).finish(),
            None => f.write_str("Shared(<empty>)"),
        }
    }
}

impl <T : ?Sized> fmt::Pointer for Shared<T> {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.as_ptr() {
            Some(ptr) => fmt::Pointer::fmt(&ptr, f),
            None => fmt::Pointer::fmt(&ptr::null::<u8>(), f),
        }
    }
}
