//! Global enhancers (interceptors, pipes, guards, filters).

use std::fmt;
use std::sync::Arc;

/// Something registered to apply across the whole application.
///
/// The bootstrap core only stores enhancers; executing them is the
/// request pipeline's job.
pub trait Enhancer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnhancerKind {
    Interceptor,
    Pipe,
    Guard,
    Filter,
}

/// A registered enhancer together with its kind.
#[derive(Debug, Clone)]
pub struct GlobalEnhancer {
    pub kind: EnhancerKind,
    pub instance: Arc<dyn Enhancer>,
}
