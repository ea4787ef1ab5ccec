//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter     | Implements        | Connects to                 |
//! |-------------|-------------------|-----------------------------|
//! | `fail_safe` | FailSafePort      | Actuator loops (atomic flag)|
//! | `tasks`     | TaskIntrospection | FreeRTOS scheduler          |
//! | `time`      | Clock             | ESP32 system timer          |

pub mod fail_safe;
pub mod tasks;
pub mod time;
