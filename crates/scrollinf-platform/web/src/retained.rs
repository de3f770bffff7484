use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::JsCast;

/// Keeps a JS closure alive for as long as the browser may call it.
///
/// Handles are often released from inside their own callback (a timer whose
/// handle is dropped when it fires, an observer disconnected while notifying),
/// and freeing a closure that is still on the stack aborts. The closure is
/// therefore dropped on the next microtask.
pub(crate) struct Retained<T: ?Sized + WasmClosure + 'static> {
    function: js_sys::Function,
    closure: Option<Closure<T>>,
}

impl<T: ?Sized + WasmClosure + 'static> Retained<T> {
    pub(crate) fn new(closure: Closure<T>) -> Self {
        let function = closure.as_ref().clone().unchecked_into::<js_sys::Function>();
        Self {
            function,
            closure: Some(closure),
        }
    }

    pub(crate) fn function(&self) -> &js_sys::Function {
        &self.function
    }
}

impl<T: ?Sized + WasmClosure + 'static> Drop for Retained<T> {
    fn drop(&mut self) {
        if let Some(closure) = self.closure.take() {
            wasm_bindgen_futures::spawn_local(async move {
                drop(closure);
            });
        }
    }
}
