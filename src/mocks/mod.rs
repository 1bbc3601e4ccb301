pub mod mock_buzzer;
pub mod mock_clock;
pub mod mock_indicator;
pub mod mock_motor;
