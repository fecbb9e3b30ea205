/// Factories for wiring sessions to infrastructure adapters
mod session_factory;

pub use session_factory::SessionFactory;
