use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// An opaque, identity-comparable event handler carried inside a prop map.
///
/// Two handlers are equal only if they point at the same underlying
/// callback; this lets `PropsDiffer` skip them on value comparison while
/// still being able to tell "the same handler survived" from "the handler
/// changed" when a caller replaces it.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&crate::event::RawEvent)>);

impl EventHandler {
    pub fn new(f: impl Fn(&crate::event::RawEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &crate::event::RawEvent) {
        (self.0)(event)
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler(0x{:x})", self.identity())
    }
}

/// The value type stored in a [`Node`](crate::ViewId)'s prop map.
///
/// Deep equality on [`Value::List`] and [`Value::Map`] is what
/// `PropsDiffer` and the similarity scorer use to decide "changed" vs
/// "unchanged"; [`Value::Handler`] compares by identity only.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64), // bit pattern of an f64, so Value can derive Eq-like comparison without NaN pitfalls
    Text(String),
    List(Vec<Value>),
    Map(FxHashMap<String, Value>),
    Handler(EventHandler),
}

impl Value {
    pub fn float(v: f64) -> Self {
        Value::Float(v.to_bits())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, Value::Handler(_))
    }
}

pub type PropMap = FxHashMap<String, Value>;
pub type ChangedProps = FxHashMap<String, Option<Value>>;
