    use super::*;

    #[test]
    fn test_api_request_skip_none_fields() {
        let request = ApiRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            messages: vec![],
            system: None,
            max_tokens: 1024,
            tools: vec![],
            stream: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("system").is_none());
        assert!(json.get("stream").is_none());
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_api_content_text() {
        let content = ApiContent::Text("Hello world".to_string());
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json, "Hello world");
    }

    #[test]
    fn test_computer_tool_serialization() {
        let tool = ApiTool::Computer {
            tool_type: COMPUTER_TOOL_TYPE,
            name: "computer",
            display_width_px: 3024,
            display_height_px: 1964,
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["type"], "computer_20250124");
        assert_eq!(json["name"], "computer");
        assert_eq!(json["display_width_px"], 3024);
        assert_eq!(json["display_height_px"], 1964);
        assert!(json.get("input_schema").is_none());
    }

    #[test]
    fn test_function_tool_serialization() {
        let tool = ApiTool::Function {
            name: "lookup".to_string(),
            description: "Look something up".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["name"], "lookup");
        assert_eq!(json["input_schema"]["type"], "object");
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_tool_result_with_image() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: vec![ToolResultBlock::Image {
                source: ImageSource::Base64 {
                    media_type: "image/png".to_string(),
                    data: "iVBOR".to_string(),
                },
            }],
            is_error: false,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["content"][0]["type"], "image");
        assert_eq!(json["content"][0]["source"]["type"], "base64");
        assert_eq!(json["content"][0]["source"]["media_type"], "image/png");
        assert!(json.get("is_error").is_none());
    }

    #[test]
    fn test_tool_result_error_flag() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_2".to_string(),
            content: vec![ToolResultBlock::Text {
                text: "Permission error".to_string(),
            }],
            is_error: true,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["is_error"], true);
        assert_eq!(json["content"][0]["text"], "Permission error");
    }

    #[test]
    fn test_api_response_deserialization() {
        let json = serde_json::json!({
            "id": "msg_123",
            "model": "claude-opus-4-20250514",
            "content": [
                {"type": "text", "text": "Opening Spotlight."},
                {"type": "tool_use", "id": "toolu_1", "name": "computer", "input": {"action": "key", "text": "cmd+space"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        let response: ApiResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.id, "msg_123");
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(response.usage.output_tokens, 5);
    }

    #[test]
    fn test_unknown_block_type_is_tolerated() {
        let json = serde_json::json!({
            "id": "msg_1",
            "model": "m",
            "content": [{"type": "thinking", "thinking": "hmm", "signature": "x"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        });
        let response: ApiResponse = serde_json::from_value(json).unwrap();
        assert!(matches!(response.content[0], ContentBlock::Unsupported));
    }

    #[test]
    fn test_stream_event_content_block_delta_text() {
        let json = serde_json::json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": "Hello"}
        });

        let event: StreamEvent = serde_json::from_value(json).unwrap();
        match event {
            StreamEvent::ContentBlockDelta { index, delta } => {
                assert_eq!(index, 0);
                match delta {
                    StreamDelta::TextDelta { text } => assert_eq!(text, "Hello"),
                    _ => panic!("Expected TextDelta"),
                }
            }
            _ => panic!("Expected ContentBlockDelta"),
        }
    }

    #[test]
    fn test_stream_event_message_delta() {
        let json = serde_json::json!({
            "type": "message_delta",
            "delta": {"stop_reason": "end_turn", "stop_sequence": null},
            "usage": {"output_tokens": 15}
        });
        let event: StreamEvent = serde_json::from_value(json).unwrap();
        match event {
            StreamEvent::MessageDelta { delta } => {
                assert_eq!(delta.stop_reason.as_deref(), Some("end_turn"));
            }
            _ => panic!("Expected MessageDelta"),
        }
    }

    #[test]
    fn test_stream_event_error() {
        let json = serde_json::json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        });

        let event: StreamEvent = serde_json::from_value(json).unwrap();
        match event {
            StreamEvent::Error { error } => {
                assert_eq!(error.error_type, "overloaded_error");
                assert_eq!(error.message, "Overloaded");
            }
            _ => panic!("Expected Error"),
        }
    }
