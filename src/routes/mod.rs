pub mod detection_map;
