pub mod threaded_relay_executor;
